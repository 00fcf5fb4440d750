//! Route table for the MovieBites REST API.
//!
//! Templates use `{id}` placeholders; [`fill`] substitutes a percent-encoded
//! segment so callers never build paths by hand.

/// Placeholder replaced by [`fill`].
pub const ID_PLACEHOLDER: &str = "{id}";

/// Substitute `{id}` in a route template with a percent-encoded segment.
pub fn fill(template: &str, id: &str) -> String {
    template.replace(ID_PLACEHOLDER, &urlencoding::encode(id))
}

pub mod categories {
    pub const COLLECTION: &str = "/categories";
    pub const ITEM: &str = "/categories/{id}";
}

pub mod webseries {
    pub const COLLECTION: &str = "/webseries";
    pub const ITEM: &str = "/webseries/{id}";
    pub const SEARCH: &str = "/webseries/search";
}

pub mod favorites {
    pub const ITEM: &str = "/favorites/{id}/favorite";
    pub const COUNT: &str = "/favorites/{id}/favorite/count";
}

pub mod likes {
    pub const ITEM: &str = "/likes/{id}/like";
    pub const COUNT: &str = "/likes/{id}/like/count";
}

pub mod users {
    pub const MOBILE_UPSERT: &str = "/users/mobile/upsert";
    pub const LOGIN: &str = "/users/login";
    pub const LIKES: &str = "/users/likes";
}
