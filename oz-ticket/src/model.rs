use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The application a ticket or RSVP is issued to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Application id
    pub id: String,
    /// The widest scope the application may ever act within
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<String>>,
}

impl Application {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            scope: None,
        }
    }

    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = Some(scope.into_iter().map(Into::into).collect());
        self
    }
}

/// A resource owner's standing authorization, as quoted by the grant store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Persistent identifier used to issue additional tickets or revoke access
    pub id: String,
    /// User id
    pub user: String,
    /// Grant expiration in milliseconds since the epoch
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<String>>,
}

impl Grant {
    pub fn new<I: Into<String>, U: Into<String>>(id: I, user: U, exp: i64) -> Self {
        Self {
            id: id.into(),
            user: user.into(),
            exp,
            scope: None,
        }
    }

    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = Some(scope.into_iter().map(Into::into).collect());
        self
    }
}

/// Whether a ticket may be reissued to another application.
///
/// Tickets are delegable unless told otherwise. Once a ticket is
/// [`Delegation::Forbidden`] every ticket reissued from it is too.
///
/// On the wire this is the `delegate` field: absent when allowed and `false`
/// when forbidden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delegation {
    #[default]
    Allowed,
    Forbidden,
}

impl Delegation {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Delegation::Allowed)
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Delegation::Forbidden)
    }
}

impl From<bool> for Delegation {
    fn from(allowed: bool) -> Self {
        if allowed {
            Delegation::Allowed
        } else {
            Delegation::Forbidden
        }
    }
}

impl Serialize for Delegation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_allowed())
    }
}

impl<'de> Deserialize<'de> for Delegation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bool::deserialize(deserializer).map(Delegation::from)
    }
}

/// Application data attached to a ticket.
///
/// `public` is shown on the plain ticket handed to the client. `private` only
/// ever travels inside the sealed ticket id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketExt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<Value>,
}

impl TicketExt {
    pub fn new(public: Option<Value>, private: Option<Value>) -> Self {
        Self { public, private }
    }
}

/// The fields an issuer decides before the ticket is finalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDraft {
    pub exp: i64,
    pub app: String,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Delegation::is_allowed")]
    pub delegate: Delegation,
    /// Id of the application that delegated this ticket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dlg: Option<String>,
}

/// A complete ticket record, as sealed into the ticket id and recovered by
/// [`TicketAuthority::parse`](crate::TicketAuthority::parse).
///
/// This includes `ext.private`, so it must not be handed back to the client.
/// Clients receive an [`IssuedTicket`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub exp: i64,
    pub app: String,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Delegation::is_allowed")]
    pub delegate: Delegation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dlg: Option<String>,
    /// Ticket secret
    pub key: String,
    /// HMAC algorithm for the ticket secret
    pub algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<TicketExt>,
    /// The sealed form of this record. Not part of the sealed payload itself.
    #[serde(skip)]
    pub id: String,
}

impl Ticket {
    pub(crate) fn from_draft(
        draft: TicketDraft,
        key: String,
        algorithm: String,
        ext: Option<TicketExt>,
    ) -> Self {
        Self {
            exp: draft.exp,
            app: draft.app,
            scope: draft.scope,
            grant: draft.grant,
            user: draft.user,
            grant_exp: draft.grant_exp,
            delegate: draft.delegate,
            dlg: draft.dlg,
            key,
            algorithm,
            ext,
            id: String::new(),
        }
    }

    /// The issuer-decided part of the ticket.
    pub fn draft(&self) -> TicketDraft {
        TicketDraft {
            exp: self.exp,
            app: self.app.clone(),
            scope: self.scope.clone(),
            grant: self.grant.clone(),
            user: self.user.clone(),
            grant_exp: self.grant_exp,
            delegate: self.delegate,
            dlg: self.dlg.clone(),
        }
    }

    /// Drops the private ext data, leaving the client view.
    pub fn into_issued(self) -> IssuedTicket {
        IssuedTicket {
            exp: self.exp,
            app: self.app,
            scope: self.scope,
            grant: self.grant,
            user: self.user,
            grant_exp: self.grant_exp,
            delegate: self.delegate,
            dlg: self.dlg,
            key: self.key,
            algorithm: self.algorithm,
            ext: self.ext.and_then(|ext| ext.public),
            id: self.id,
        }
    }
}

/// The ticket as returned to the client: the sealed `id` plus the plain
/// fields it needs, with `ext` reduced to the public data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTicket {
    pub exp: i64,
    pub app: String,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Delegation::is_allowed")]
    pub delegate: Delegation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dlg: Option<String>,
    pub key: String,
    pub algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
    pub id: String,
}

/// The sealed payload of an RSVP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RsvpEnvelope {
    pub app: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dlg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<String>>,
}
