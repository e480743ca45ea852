//! Maps `Box<dyn Error>` from the provider seam to a typed `StrideError`.
//!
//! `LocationProvider` returns boxed errors; with the `provider-errors` feature
//! the bundled `ProviderError` is downcast precisely, otherwise the message is
//! inspected.

use crate::error::StrideError;

pub fn map_provider_error(e: &(dyn std::error::Error + 'static)) -> StrideError {
    #[cfg(feature = "provider-errors")]
    {
        use stride_providers::error::ProviderError;
        if let Some(pe) = e.downcast_ref::<ProviderError>() {
            return match pe {
                ProviderError::Timeout => StrideError::Timeout,
                ProviderError::Closed => StrideError::ProviderClosed,
                other => StrideError::Provider(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        StrideError::Timeout
    } else if lower.contains("closed") || lower.contains("disconnected") {
        StrideError::ProviderClosed
    } else {
        StrideError::Provider(s)
    }
}
