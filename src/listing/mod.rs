//! Listing enumeration
//!
//! Finds which entries a user owns. This is a thin scrape of the listing
//! page; everything downstream only consumes the [`EntryRef`]s it returns.

mod parser;

pub use parser::{parse_listing, parse_user_id};

use crate::catalog::Catalog;
use crate::entry::EntryRef;
use crate::extract::PageSelectors;
use crate::session::{Session, SessionError};
use crate::ArchiveError;

/// Lists the entries visible to `user_id`, in page order
pub async fn list_entries<S: Session + ?Sized>(
    session: &S,
    catalog: &Catalog,
    selectors: &PageSelectors,
    user_id: &str,
) -> Result<Vec<EntryRef>, ArchiveError> {
    let url = catalog.listing_url(user_id)?;
    let page = session.navigate(&url).await?;
    let entries = parse_listing(&page.document(), page.url(), &selectors.listing_links);
    tracing::info!("Found {} entries for user {}", entries.len(), user_id);
    Ok(entries)
}

/// Determines the logged-in user from the catalog home page
///
/// # Errors
///
/// [`SessionError::NotAuthenticated`] when the page carries no profile link,
/// which is what a logged-out session sees.
pub async fn discover_user_id<S: Session + ?Sized>(
    session: &S,
    catalog: &Catalog,
    selectors: &PageSelectors,
) -> Result<String, ArchiveError> {
    let url = catalog.home_url()?;
    let page = session.navigate(&url).await?;
    parse_user_id(&page.document(), page.url(), &selectors.profile_link).ok_or_else(|| {
        SessionError::NotAuthenticated(format!("no profile link found on {}", url)).into()
    })
}
