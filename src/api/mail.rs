//! Mailbox listing over the webmail API.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;
use url::form_urlencoded;

use crate::constants::{CSRF_COOKIE_NAME, url_header_value};
use crate::endpoints::Endpoints;
use crate::transport::SessionTransport;

use super::error::ApiError;

/// Wire code for oldest-first sorting.
const SORT_DATE_ASC: u32 = 44;
/// Wire code for newest-first sorting.
const SORT_DATE_DESC: u32 = 45;

/// Mailbox folder selector.
///
/// `SF_*` identifiers are the platform's system folders, `VF_*` its virtual
/// filters; accounts can define further custom folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailFolder {
    /// Received mail (`SF_INBOX`).
    Inbox,
    /// Saved drafts (`SF_DRAFT`).
    Drafts,
    /// Sent mail (`SF_OUTBOX`).
    Outbox,
    /// Spam (`SF_JUNK`).
    Junk,
    /// Deleted mail (`SF_TRASH`).
    Trash,
    /// Flagged mail (`VF_flagged`).
    Flagged,
    /// Mail carrying attachments (`VF_attachments`).
    Attachments,
    /// Unread mail (`VF_unread`).
    Unread,
    /// Any other folder identifier the account defines.
    Custom(String),
}

impl MailFolder {
    /// Platform identifier for the folder.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inbox => "SF_INBOX",
            Self::Drafts => "SF_DRAFT",
            Self::Outbox => "SF_OUTBOX",
            Self::Junk => "SF_JUNK",
            Self::Trash => "SF_TRASH",
            Self::Flagged => "VF_flagged",
            Self::Attachments => "VF_attachments",
            Self::Unread => "VF_unread",
            Self::Custom(name) => name,
        }
    }
}

/// Sort order for listed mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first.
    DateAsc,
    /// Newest first (the webmail front-end default).
    #[default]
    DateDesc,
}

impl SortOrder {
    fn wire_code(self) -> u32 {
        match self {
            Self::DateAsc => SORT_DATE_ASC,
            Self::DateDesc => SORT_DATE_DESC,
        }
    }
}

/// Options for a mailbox listing.
#[derive(Debug, Clone)]
pub struct MailQuery {
    /// Folder to list.
    pub folder: MailFolder,
    /// Sort order.
    pub sort_by: SortOrder,
    /// 1-based page number; values below 1 are clamped to 1.
    pub page: u32,
    /// Mails per page. The platform applies no upper bound.
    pub per_page: u32,
}

impl Default for MailQuery {
    fn default() -> Self {
        Self {
            folder: MailFolder::Inbox,
            sort_by: SortOrder::DateDesc,
            page: 1,
            per_page: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MailEnvelope {
    response: MailBody,
}

#[derive(Debug, Deserialize)]
struct MailBody {
    #[serde(rename = "mailHeader")]
    mail_header: Option<Value>,
}

/// Fetches a page of mail headers.
///
/// The CSRF token minted at login rides along both as the session cookie and
/// as the `tok` form field. The envelope's `response.mailHeader` value is
/// returned as-is; interpreting the header objects is the caller's concern.
///
/// # Errors
///
/// [`ApiError::CsrfCookieMissing`] without a stored `CSRF_TOKEN` cookie
/// (nothing is sent in that case), [`ApiError::UnexpectedEnvelope`] when the
/// reply lacks the envelope shape, and [`ApiError::Transport`] for wire
/// failures.
#[instrument(level = "debug", skip(transport, endpoints))]
pub async fn fetch_mail_headers(
    transport: &mut SessionTransport,
    endpoints: &Endpoints,
    query: &MailQuery,
) -> Result<Value, ApiError> {
    let token = transport
        .cookie_jar()
        .lookup(CSRF_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .ok_or(ApiError::CsrfCookieMissing)?;

    let page = query.page.max(1);
    let start = (page - 1) * query.per_page;
    let end = (start + query.per_page).saturating_sub(1);

    let body = form_urlencoded::Serializer::new(String::new())
        .append_pair("FOLDER", query.folder.as_str())
        .append_pair("SORTBY", &query.sort_by.wire_code().to_string())
        .append_pair("FLAGS_FILTER_TYPE", "0")
        .append_pair("NBDISPLAYMSG", &query.per_page.to_string())
        .append_pair("returnProfileId", "gmhlProf")
        .append_pair("append", "false")
        .append_pair("PAGE", &page.to_string())
        .append_pair("START", &start.to_string())
        .append_pair("END", &end.to_string())
        // The platform's own spelling; the API matches on it verbatim.
        .append_pair("callContext", "pagintationInMailListInitRoute")
        .append_pair("DISPLAY_ATTACHMENTS_INFOS", "true")
        .append_pair("tok", &token)
        .finish();

    let mut headers = HeaderMap::new();
    headers.insert(REFERER, url_header_value(endpoints.webmail_ui_url.as_str()));
    headers.insert(
        ORIGIN,
        url_header_value(&endpoints.webmail_ui_url.origin().ascii_serialization()),
    );
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
    );

    let response = transport
        .post(
            &format!("{}getMailHeaderList.json", endpoints.webmail_api_url),
            body,
            Some(headers),
        )
        .await?;

    response
        .json::<MailEnvelope>()
        .ok()
        .and_then(|envelope| envelope.response.mail_header)
        .ok_or(ApiError::UnexpectedEnvelope {
            endpoint: "getMailHeaderList.json",
        })
}
