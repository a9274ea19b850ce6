use vitrine_shared::ImageId;

/// Client-side location: the grid at `/`, or one image at `/i/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Grid,
    Image(ImageId),
}

impl Route {
    /// Parse a path (query string and fragment are ignored). `None` for
    /// anything that isn't a gallery route.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let path = path.trim_end_matches('/');

        if path.is_empty() {
            return Some(Self::Grid);
        }

        match path.strip_prefix("/i/") {
            Some(id) if !id.is_empty() && !id.contains('/') => Some(Self::Image(ImageId::from(id))),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Grid => "/".to_string(),
            Self::Image(id) => format!("/i/{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gallery_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Grid));
        assert_eq!(Route::parse(""), Some(Route::Grid));
        assert_eq!(Route::parse("/?q=S-1"), Some(Route::Grid));
        assert_eq!(
            Route::parse("/i/img-004"),
            Some(Route::Image(ImageId::from("img-004")))
        );
        assert_eq!(
            Route::parse("/i/img-004/#top"),
            Some(Route::Image(ImageId::from("img-004")))
        );
    }

    #[test]
    fn rejects_other_paths() {
        assert_eq!(Route::parse("/i/"), None);
        assert_eq!(Route::parse("/i/a/b"), None);
        assert_eq!(Route::parse("/about"), None);
    }

    #[test]
    fn path_round_trips() {
        let route = Route::Image(ImageId::from("abc"));
        assert_eq!(Route::parse(&route.path()), Some(route));
        assert_eq!(Route::Grid.path(), "/");
    }
}
