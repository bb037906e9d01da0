/// Screens reachable by path, mirroring the board's web routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List { search: Option<String> },
    Login,
    Logout,
    Create,
    Detail { id: String },
}

impl Route {
    /// Parse a path such as `/`, `/?search=foo`, `/login/` or `/messages/42/`.
    /// Returns `None` for anything else.
    pub fn parse(input: &str) -> Option<Route> {
        let (path, query) = match input.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (input, None),
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Some(Route::List {
                search: query.and_then(search_param),
            }),
            ["login"] => Some(Route::Login),
            ["logout"] => Some(Route::Logout),
            ["messages", "create"] => Some(Route::Create),
            ["messages", id] => Some(Route::Detail {
                id: decode(id)?,
            }),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::List { search: None } => "/".to_string(),
            Route::List {
                search: Some(term),
            } => format!("/?search={}", urlencoding::encode(term)),
            Route::Login => "/login/".to_string(),
            Route::Logout => "/logout/".to_string(),
            Route::Create => "/messages/create/".to_string(),
            Route::Detail { id } => format!("/messages/{}/", urlencoding::encode(id)),
        }
    }
}

fn decode(raw: &str) -> Option<String> {
    urlencoding::decode(raw).ok().map(|s| s.into_owned())
}

/// Value of the `search` parameter; empty counts as absent.
/// `+` means space only in the query string.
fn search_param(query: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == "search")
        .and_then(|(_, value)| decode(&value.replace('+', " ")))
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_list() {
        assert_eq!(Route::parse("/"), Some(Route::List { search: None }));
        assert_eq!(Route::parse(""), Some(Route::List { search: None }));
    }

    #[test]
    fn fixed_paths_with_and_without_trailing_slash() {
        assert_eq!(Route::parse("/login/"), Some(Route::Login));
        assert_eq!(Route::parse("/login"), Some(Route::Login));
        assert_eq!(Route::parse("/logout/"), Some(Route::Logout));
        assert_eq!(Route::parse("/messages/create/"), Some(Route::Create));
    }

    #[test]
    fn message_detail() {
        assert_eq!(
            Route::parse("/messages/TWVzc2FnZVR5cGU6MQ==/"),
            Some(Route::Detail {
                id: "TWVzc2FnZVR5cGU6MQ==".to_string()
            })
        );
    }

    #[test]
    fn plus_in_message_id_is_literal() {
        assert_eq!(
            Route::parse("/messages/ab+c/"),
            Some(Route::Detail {
                id: "ab+c".to_string()
            })
        );
        let route = Route::Detail {
            id: "a+b c".to_string(),
        };
        assert_eq!(Route::parse(&route.path()), Some(route));
    }

    #[test]
    fn search_term_is_decoded() {
        assert_eq!(
            Route::parse("/?search=hello%20world"),
            Some(Route::List {
                search: Some("hello world".to_string())
            })
        );
        assert_eq!(
            Route::parse("/?page=2&search=a+b"),
            Some(Route::List {
                search: Some("a b".to_string())
            })
        );
    }

    #[test]
    fn empty_search_is_absent() {
        assert_eq!(Route::parse("/?search="), Some(Route::List { search: None }));
        assert_eq!(Route::parse("/?search"), Some(Route::List { search: None }));
    }

    #[test]
    fn unknown_paths() {
        assert_eq!(Route::parse("/admin/"), None);
        assert_eq!(Route::parse("/messages/1/edit/"), None);
    }

    #[test]
    fn path_roundtrips_through_parse() {
        let routes = [
            Route::List { search: None },
            Route::List {
                search: Some("café & co".to_string()),
            },
            Route::Login,
            Route::Logout,
            Route::Create,
            Route::Detail {
                id: "42".to_string(),
            },
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }
}
