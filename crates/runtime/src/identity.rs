//! Who is playing, and whether their results can be reconciled.

use std::fmt;

use client_blockchain_core::Address;

use crate::repository::Partition;

/// Opaque identifier assigned by the identity provider.
pub type IdentityId = u64;

/// An identity with a ledger account attached. Only these sessions are
/// eligible for reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WalletBinding {
    pub identity: IdentityId,
    pub address: Address,
}

/// The player behind a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionIdentity {
    Anonymous,
    Identified { id: IdentityId },
    WithWallet(WalletBinding),
}

impl SessionIdentity {
    /// Builds the variant from what the identity provider supplied.
    ///
    /// A wallet without an identity has nowhere to keep a snapshot, so it is
    /// treated as anonymous.
    pub fn from_parts(identity: Option<IdentityId>, wallet: Option<Address>) -> Self {
        match (identity, wallet) {
            (Some(identity), Some(address)) => {
                SessionIdentity::WithWallet(WalletBinding { identity, address })
            }
            (Some(id), None) => SessionIdentity::Identified { id },
            (None, _) => SessionIdentity::Anonymous,
        }
    }

    pub fn id(&self) -> Option<IdentityId> {
        match self {
            SessionIdentity::Anonymous => None,
            SessionIdentity::Identified { id } => Some(*id),
            SessionIdentity::WithWallet(binding) => Some(binding.identity),
        }
    }

    pub fn wallet(&self) -> Option<&WalletBinding> {
        match self {
            SessionIdentity::WithWallet(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn partition(&self) -> Partition {
        match self.id() {
            Some(id) => Partition::Identity(id),
            None => Partition::Temporary,
        }
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionIdentity::Anonymous => write!(f, "anonymous"),
            SessionIdentity::Identified { id } => write!(f, "#{id}"),
            SessionIdentity::WithWallet(binding) => {
                write!(f, "#{} ({})", binding.identity, binding.address.short(6, 4))
            }
        }
    }
}
