//! Regular-expression search over the whole vault.
//!
//! The PrivX listing only filters by substring, so the search walks every
//! page and filters names client-side. Pages are fetched strictly in order,
//! and any failure aborts the search with no partial result.

use regex::Regex;
use std::collections::BTreeMap;

use super::navigator::resolve_value;
use super::transport::VaultTransport;
use super::types::{ConversionStrategy, FindRef};
use crate::errors::{Error, Result};

/// Number of listing entries requested per page
pub const PAGE_SIZE: usize = 100;

/// Reject the search parameters PrivX cannot honour.
fn check_supported(find: &FindRef) -> Result<()> {
    if find.path.is_some() {
        return Err(Error::NotImplemented {
            parameter: "ref.Path",
        });
    }
    if find.tags.is_some() {
        return Err(Error::NotImplemented {
            parameter: "ref.Tags",
        });
    }
    if find.conversion_strategy != ConversionStrategy::Default {
        return Err(Error::NotImplemented {
            parameter: "ref.ConversionStrategy",
        });
    }
    Ok(())
}

/// Compile the name filter; a missing filter matches every name.
fn name_filter(find: &FindRef) -> Result<Regex> {
    let pattern = find.name.as_ref().map_or("", |name| name.regexp.as_str());
    Regex::new(pattern).map_err(|source| Error::InvalidFilter {
        pattern: pattern.to_string(),
        source,
    })
}

/// Return every secret whose name matches the filter, keyed by name.
///
/// Each value is the secret's whole document as JSON, so secrets that share
/// field names internally never collide.
pub async fn find_all(
    transport: &dyn VaultTransport,
    find: &FindRef,
) -> Result<BTreeMap<String, Vec<u8>>> {
    check_supported(find)?;
    let filter = name_filter(find)?;

    let mut results = BTreeMap::new();
    let mut offset = 0;

    loop {
        let page = transport.list_documents(offset, PAGE_SIZE).await?;
        let fetched = page.items.len();

        tracing::debug!(offset, fetched, reported = page.count, "Fetched PrivX listing page");

        for summary in page.items {
            if !filter.is_match(&summary.name) {
                continue;
            }

            let document = transport.get_document(&summary.name).await?;
            let value = resolve_value(&summary.name, &document, None)?;
            results.insert(summary.name, value);
        }

        if fetched < PAGE_SIZE {
            break;
        }
        offset += PAGE_SIZE;
    }

    tracing::debug!(matched = results.len(), pattern = %filter, "PrivX search finished");
    Ok(results)
}
