//! Outbound identity shared by page and file requests.
//!
//! The upstream mirrors negotiate content on the User-Agent. The mobile
//! Safari string below is the one they serve a plain document page to, so it
//! must stay byte-for-byte identical for compatibility.

/// Mobile browser User-Agent sent with every page fetch and file download.
pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 11_3_1 like Mac OS X) \
    AppleWebKit/603.1.30 (KHTML, like Gecko) Version/10.0 Mobile/14E304 Safari/602.1";
