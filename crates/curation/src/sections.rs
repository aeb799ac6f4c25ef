use tracing::debug;

use crate::config::SectionLimits;
use crate::models::{Candidate, SectionBundle};

/// Distributes a ranked list into bounded newsletter sections.
///
/// Candidates of the reserved category only ever land in `technical`; once
/// that section is full they are dropped rather than redistributed. Everyone
/// else fills `featured`, then `headlines`. Overflow is discarded.
pub fn allocate(limits: &SectionLimits, ranked: Vec<Candidate>) -> SectionBundle {
    let mut bundle = SectionBundle::default();

    for candidate in ranked {
        if candidate.category == limits.reserved_category {
            if bundle.technical.len() < limits.max_reserved {
                bundle.technical.push(candidate);
            } else {
                debug!("Reserved section full, dropping '{}'", candidate.title);
            }
        } else if bundle.featured.len() < limits.max_featured {
            bundle.featured.push(candidate);
        } else if bundle.headlines.len() < limits.max_regular {
            bundle.headlines.push(candidate);
        } else {
            debug!("All sections full, dropping '{}'", candidate.title);
        }
    }

    bundle
}
