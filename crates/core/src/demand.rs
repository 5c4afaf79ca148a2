//! Demand resolution: which advertisement occurrences a playlist must carry.
//!
//! The result is an ordered multiset of [`Advertisement`]s. Advertisements
//! already embedded in the previous playlist come first so regenerating a
//! playlist keeps their slots stable; advertisements newly targeting the
//! venue follow. Both groups are ordered by `(created_at, id)`.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::generation_log::GenerationLog;
use crate::playlist::AdvertEntry;
use crate::track::{AdvertDemand, Advertisement};
use crate::types::DbId;

/// Compute the advertisement occurrences required for one (venue, date).
///
/// - `existing`: advert entries of the previous playlist (empty if none).
/// - `demand`: advertisements valid on the date that carry a demand record
///   for the venue, with their repeat counts.
///
/// Previously scheduled advertisements whose demand record is gone are
/// dropped. A lowered repeat count trims the occurrences, a raised one
/// extends them.
pub fn resolve_demand(
    existing: &[AdvertEntry],
    demand: &[AdvertDemand],
    log: &mut GenerationLog,
) -> Vec<Advertisement> {
    let by_id: HashMap<DbId, &AdvertDemand> =
        demand.iter().map(|d| (d.advertisement.id, d)).collect();

    // Distinct embedded advertisements with their current occurrence count.
    let mut embedded: Vec<(&Advertisement, u32)> = Vec::new();
    for entry in existing {
        match embedded
            .iter_mut()
            .find(|(ad, _)| ad.id == entry.advertisement.id)
        {
            Some((_, count)) => *count += 1,
            None => embedded.push((&entry.advertisement, 1)),
        }
    }
    embedded.sort_by_key(|(ad, _)| ad.order_key());

    let mut resolved = Vec::new();

    for (ad, present) in &embedded {
        let Some(record) = by_id.get(&ad.id) else {
            log.line(format!(
                "demand: dropped advert {} '{}' ({present} old occurrences, no demand record)",
                ad.id, ad.name
            ));
            continue;
        };

        let required = record.repeat_count;
        match present.cmp(&required) {
            Ordering::Equal => log.line(format!(
                "demand: kept advert {} '{}' x{required}",
                ad.id, ad.name
            )),
            Ordering::Less => log.line(format!(
                "demand: extended advert {} '{}' x{present} -> x{required}",
                ad.id, ad.name
            )),
            Ordering::Greater => log.line(format!(
                "demand: trimmed advert {} '{}' x{present} -> x{required}",
                ad.id, ad.name
            )),
        }
        push_occurrences(&mut resolved, &record.advertisement, required);
    }

    let mut introduced: Vec<&AdvertDemand> = demand
        .iter()
        .filter(|d| !embedded.iter().any(|(ad, _)| ad.id == d.advertisement.id))
        .collect();
    introduced.sort_by_key(|d| d.advertisement.order_key());

    for record in introduced {
        log.line(format!(
            "demand: introduced advert {} '{}' x{}",
            record.advertisement.id, record.advertisement.name, record.repeat_count
        ));
        push_occurrences(&mut resolved, &record.advertisement, record.repeat_count);
    }

    resolved
}

fn push_occurrences(out: &mut Vec<Advertisement>, ad: &Advertisement, count: u32) {
    out.extend(std::iter::repeat(ad).take(count as usize).cloned());
}
