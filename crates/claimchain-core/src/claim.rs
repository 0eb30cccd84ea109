//! Claims: signed, immutable facts submitted by an identity.
//!
//! A [`SignedClaim`] is what arrives at the store. At the boundary it is
//! normalised into a [`ClaimSubmission`], which carries any access directive
//! as an explicit field, whether it came out-of-band or under the reserved
//! [`ALLOW_KEY`] inside the payload.

use serde::{Deserialize, Serialize};

use crate::reference::{claim_from_link, identity_from_reference, identity_reference, link_for};
use crate::types::{ClaimId, IdentityKey, Signature};

/// Reserved payload field carrying an access directive.
pub const ALLOW_KEY: &str = "@allow";

/// An access directive: who besides the owner may read a claim.
///
/// Shape: `{ "scope"?: <claim link>, "identity"?: <identity reference> }`.
/// An absent `identity` makes the target public. A present `identity`
/// grants that one accessor, cumulative across claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDirective {
    /// Link to an earlier claim of the same identity to narrow the ACL to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Identity reference of the accessor being granted.
    #[serde(default, alias = "did", skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

/// What a directive grants, once its `identity` field is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveGrant {
    /// No accessor given: everyone may read.
    Public,
    /// One accessor identity may read.
    Identity(IdentityKey),
    /// An accessor was given but is not an identity reference.
    Unrecognized,
}

impl AccessDirective {
    /// Make the identity's claims public.
    pub fn public() -> Self {
        Self::default()
    }

    /// Grant `accessor` identity-wide read access.
    pub fn grant(accessor: &IdentityKey) -> Self {
        Self {
            scope: None,
            identity: Some(identity_reference(accessor)),
        }
    }

    /// Narrow this directive to a single earlier claim.
    pub fn scoped_to(mut self, claim_id: &ClaimId) -> Self {
        self.scope = Some(link_for(claim_id));
        self
    }

    /// Read a directive from the value stored under [`ALLOW_KEY`].
    ///
    /// Empty values (`null`, `false`, `0`, `""`) carry no directive. An object
    /// contributes its `scope` and `identity` (or `did`) fields; any other
    /// value is a directive without either, which makes the target public.
    /// A non-string `identity` never names an accessor.
    pub fn from_payload(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null | Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::String(s) if s.is_empty() => None,
            Value::Object(fields) => {
                let scope = fields.get("scope").and_then(Value::as_str).map(str::to_owned);
                let identity = fields
                    .get("identity")
                    .or_else(|| fields.get("did"))
                    .filter(|v| !v.is_null())
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                Some(Self { scope, identity })
            }
            _ => Some(Self::public()),
        }
    }

    /// The claim this directive is scoped to, if `scope` is a claim link.
    pub fn scope_claim(&self) -> Option<ClaimId> {
        self.scope.as_deref().and_then(claim_from_link)
    }

    /// Interpret the `identity` field.
    pub fn grant_kind(&self) -> DirectiveGrant {
        match self.identity.as_deref() {
            None => DirectiveGrant::Public,
            Some(reference) => match identity_from_reference(reference) {
                Some(key) => DirectiveGrant::Identity(key),
                None => DirectiveGrant::Unrecognized,
            },
        }
    }
}

/// A claim as submitted for admission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedClaim {
    /// The payload. Signed over its canonical encoding.
    pub message: serde_json::Value,
    /// Signature over the canonical payload; becomes the claim id.
    pub signature: Signature,
    /// The identity submitting the claim.
    pub public_key: IdentityKey,
    /// Out-of-band access directive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessDirective>,
}

impl SignedClaim {
    /// The id this claim will be stored under.
    pub fn claim_id(&self) -> ClaimId {
        ClaimId::from(&self.signature)
    }

    /// Normalise into a submission with an explicit directive.
    ///
    /// A directive under [`ALLOW_KEY`] wins over the out-of-band one. The
    /// payload key is only consulted when `payload_directives` is set. See
    /// [`AccessDirective::from_payload`] for how its value is read.
    pub fn submission(&self, payload_directives: bool) -> ClaimSubmission {
        let in_payload = if payload_directives {
            self.message.get(ALLOW_KEY).and_then(AccessDirective::from_payload)
        } else {
            None
        };
        let directive = in_payload.or_else(|| self.access.clone());

        match directive {
            Some(directive) => ClaimSubmission::Directed {
                data: self.message.clone(),
                directive,
            },
            None => ClaimSubmission::Plain(self.message.clone()),
        }
    }
}

/// A claim payload, with or without an access directive.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimSubmission {
    /// Payload only.
    Plain(serde_json::Value),
    /// Payload plus the directive to apply on admission.
    Directed {
        data: serde_json::Value,
        directive: AccessDirective,
    },
}

impl ClaimSubmission {
    /// The payload to store.
    pub fn data(&self) -> &serde_json::Value {
        match self {
            ClaimSubmission::Plain(data) => data,
            ClaimSubmission::Directed { data, .. } => data,
        }
    }

    /// The directive, if any.
    pub fn directive(&self) -> Option<&AccessDirective> {
        match self {
            ClaimSubmission::Plain(_) => None,
            ClaimSubmission::Directed { directive, .. } => Some(directive),
        }
    }

    /// Split into payload and directive.
    pub fn into_parts(self) -> (serde_json::Value, Option<AccessDirective>) {
        match self {
            ClaimSubmission::Plain(data) => (data, None),
            ClaimSubmission::Directed { data, directive } => (data, Some(directive)),
        }
    }
}

/// The outward shape of a stored claim. ACL metadata never appears here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimView {
    pub data: serde_json::Value,
    pub signature: Signature,
    pub previous: Option<ClaimId>,
}

/// Proof that a caller holds an identity: a signature by `key` over a
/// request-specific message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessorProof {
    pub key: IdentityKey,
    pub signature: Signature,
}

impl AccessorProof {
    pub fn new(key: IdentityKey, signature: Signature) -> Self {
        Self { key, signature }
    }
}
