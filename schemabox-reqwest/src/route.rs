//! REST routes of the registry.

use std::fmt;

use reqwest::{Method, Url};
use schemabox_core::{ClientError, SchemaId, Version};

/// One registry resource, addressed relative to an endpoint's base URL.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Route<'a> {
    /// `/schemas/ids/{id}`
    SchemaById(SchemaId),
    /// `/subjects`
    Subjects,
    /// `/subjects/{subject}`
    Subject(&'a str),
    /// `/subjects/{subject}/versions`
    SubjectVersions(&'a str),
    /// `/subjects/{subject}/versions/{version}`
    SubjectVersion(&'a str, Version),
}

impl Route<'_> {
    /// Stable route name, used for spans and metric labels.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::SchemaById(_) => "schema_by_id",
            Self::Subjects => "subjects",
            Self::Subject(_) => "subject",
            Self::SubjectVersions(_) => "subject_versions",
            Self::SubjectVersion(..) => "subject_version",
        }
    }

    /// Subject addressed by the route, if any.
    pub(crate) fn subject(&self) -> Option<&str> {
        match *self {
            Self::SchemaById(_) | Self::Subjects => None,
            Self::Subject(subject)
            | Self::SubjectVersions(subject)
            | Self::SubjectVersion(subject, _) => Some(subject),
        }
    }

    /// Rejects subjects that cannot survive as a path segment.
    ///
    /// `.` and `..` are dot-segments: URL parsing drops them, even
    /// percent-encoded, and the request would land on another route.
    pub(crate) fn validate(&self) -> Result<(), ClientError> {
        match self.subject() {
            Some(subject @ ("." | "..")) => Err(ClientError::InvalidSubject(subject.to_owned())),
            _ => Ok(()),
        }
    }

    /// Resolves the route against an endpoint's base URL.
    ///
    /// The base path is kept and each dynamic part becomes exactly one
    /// percent-encoded path segment. The base must be a URL that
    /// can act as a base, which the transport builder guarantees.
    pub(crate) fn url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            match *self {
                Self::SchemaById(id) => {
                    segments.extend(["schemas", "ids", id.to_string().as_str()]);
                }
                Self::Subjects => {
                    segments.push("subjects");
                }
                Self::Subject(subject) => {
                    segments.extend(["subjects", subject]);
                }
                Self::SubjectVersions(subject) => {
                    segments.extend(["subjects", subject, "versions"]);
                }
                Self::SubjectVersion(subject, version) => {
                    segments.extend([
                        "subjects",
                        subject,
                        "versions",
                        version.to_string().as_str(),
                    ]);
                }
            }
        }
        url
    }
}

impl fmt::Display for Route<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaById(id) => write!(f, "/schemas/ids/{id}"),
            Self::Subjects => f.write_str("/subjects"),
            Self::Subject(subject) => write!(f, "/subjects/{subject}"),
            Self::SubjectVersions(subject) => write!(f, "/subjects/{subject}/versions"),
            Self::SubjectVersion(subject, version) => {
                write!(f, "/subjects/{subject}/versions/{version}")
            }
        }
    }
}

/// A route together with the HTTP method used on it.
#[derive(Debug, Clone)]
pub(crate) struct Call<'a> {
    pub(crate) method: Method,
    pub(crate) route: Route<'a>,
}

impl<'a> Call<'a> {
    pub(crate) fn get(route: Route<'a>) -> Self {
        Self {
            method: Method::GET,
            route,
        }
    }

    pub(crate) fn post(route: Route<'a>) -> Self {
        Self {
            method: Method::POST,
            route,
        }
    }

    pub(crate) fn delete(route: Route<'a>) -> Self {
        Self {
            method: Method::DELETE,
            route,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn routes_follow_registry_paths() {
        let base = base("http://localhost:8081");
        let cases = [
            (Route::SchemaById(SchemaId::new(7)), "/schemas/ids/7"),
            (Route::Subjects, "/subjects"),
            (Route::Subject("s1"), "/subjects/s1"),
            (Route::SubjectVersions("s1"), "/subjects/s1/versions"),
            (
                Route::SubjectVersion("s1", Version::Number(2)),
                "/subjects/s1/versions/2",
            ),
            (
                Route::SubjectVersion("s1", Version::Latest),
                "/subjects/s1/versions/latest",
            ),
        ];
        for (route, path) in cases {
            assert_eq!(route.url(&base).path(), path);
            assert_eq!(route.to_string(), path);
        }
    }

    #[test]
    fn base_path_is_preserved() {
        let url = Route::Subjects.url(&base("http://localhost:8081/registry/"));
        assert_eq!(url.as_str(), "http://localhost:8081/registry/subjects");

        let url = Route::Subjects.url(&base("http://localhost:8081/registry"));
        assert_eq!(url.as_str(), "http://localhost:8081/registry/subjects");
    }

    #[test]
    fn subject_is_a_single_encoded_segment() {
        let url = Route::SubjectVersions("team/orders value").url(&base("http://localhost:8081"));
        assert_eq!(url.path(), "/subjects/team%2Forders%20value/versions");

        for subject in ["...", ".hidden", "a.b"] {
            let route = Route::SubjectVersions(subject);
            assert!(route.validate().is_ok());
            assert_eq!(
                route.url(&base("http://localhost:8081")).path(),
                format!("/subjects/{subject}/versions")
            );
        }
    }

    #[test]
    fn dot_segment_subjects_are_rejected() {
        let routes = [
            Route::Subject("."),
            Route::Subject(".."),
            Route::SubjectVersions("."),
            Route::SubjectVersions(".."),
            Route::SubjectVersion("..", Version::Latest),
        ];
        for route in routes {
            let err = route.validate().unwrap_err();
            assert!(matches!(
                err,
                ClientError::InvalidSubject(ref subject) if Some(subject.as_str()) == route.subject()
            ));
        }
        assert!(Route::Subjects.validate().is_ok());
        assert!(Route::SchemaById(SchemaId::new(1)).validate().is_ok());
    }
}
