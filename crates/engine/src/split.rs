//! Pure split arithmetic: how an expense total divides into the two
//! participant shares.
use crate::{EngineError, Money, Participant};

/// Rule for dividing an expense between the two participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Both shares are half the total; the payer absorbs an odd cent.
    Equal,
    /// The non-payer owes `other_share`; the payer covers the rest.
    Custom { other_share: Money },
}

/// Computes `(share_a, share_b)` for a total paid by `paid_by`.
///
/// Deterministic and side-effect free. Creation and edit paths both go
/// through here, never adjusting stored shares directly, so the two
/// shares always sum exactly to the total.
pub fn compute_split(
    total: Money,
    paid_by: Participant,
    policy: SplitPolicy,
) -> Result<(Money, Money), EngineError> {
    if total.is_negative() {
        return Err(EngineError::Validation(
            "amount must not be negative".to_string(),
        ));
    }

    let other_share = match policy {
        SplitPolicy::Equal => total.half_down(),
        SplitPolicy::Custom { other_share } => {
            if other_share.is_negative() || other_share > total {
                return Err(EngineError::SplitOutOfRange(format!(
                    "share must be between $0.00 and {total}"
                )));
            }
            other_share
        }
    };
    let payer_share = total - other_share;

    Ok(match paid_by {
        Participant::A => (payer_share, other_share),
        Participant::B => (other_share, payer_share),
    })
}
