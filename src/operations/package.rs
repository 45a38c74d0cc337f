//! Depex package and repository requests

use reqwest::Method;
use serde_json::{json, Value};
use url::form_urlencoded;

use super::validate;
use super::BackendCall;
use crate::core::error::{Error, Result};
use crate::graph::NodeType;

pub const PACKAGE_STATUS_PATH: &str = "/depex/package/status";
pub const VERSION_STATUS_PATH: &str = "/depex/version/status";
pub const PACKAGE_INIT_PATH: &str = "/depex/package/init";
pub const REPOSITORY_INIT_PATH: &str = "/depex/repository/init";
pub const USER_REPOSITORIES_PATH: &str = "/depex/repositories";

#[derive(Debug, Clone, PartialEq)]
pub enum PackageRequest {
    PackageStatus {
        node_type: NodeType,
        package_name: String,
    },
    VersionStatus {
        node_type: NodeType,
        package_name: String,
        version_name: String,
    },
    InitPackage {
        node_type: NodeType,
        package_name: String,
    },
    InitRepository {
        owner: String,
        name: String,
        user_id: String,
    },
    UserRepositories {
        user_id: String,
    },
}

fn ecosystem(node_type: NodeType) -> Result<NodeType> {
    if node_type.is_package() {
        Ok(node_type)
    } else {
        Err(Error::invalid("node_type", "must be a package ecosystem"))
    }
}

fn non_empty(field: &str, value: &str) -> Result<String> {
    validate::required(field, Some(value)).map(|v| v.trim().to_string())
}

impl PackageRequest {
    pub fn package_status(node_type: NodeType, package_name: &str) -> Result<Self> {
        Ok(PackageRequest::PackageStatus {
            node_type: ecosystem(node_type)?,
            package_name: non_empty("package_name", package_name)?,
        })
    }

    pub fn version_status(
        node_type: NodeType,
        package_name: &str,
        version_name: &str,
    ) -> Result<Self> {
        Ok(PackageRequest::VersionStatus {
            node_type: ecosystem(node_type)?,
            package_name: non_empty("package_name", package_name)?,
            version_name: non_empty("version_name", version_name)?,
        })
    }

    pub fn init_package(node_type: NodeType, package_name: &str) -> Result<Self> {
        Ok(PackageRequest::InitPackage {
            node_type: ecosystem(node_type)?,
            package_name: non_empty("package_name", package_name)?,
        })
    }

    pub fn init_repository(owner: &str, name: &str, user_id: &str) -> Result<Self> {
        Ok(PackageRequest::InitRepository {
            owner: non_empty("owner", owner)?,
            name: non_empty("name", name)?,
            user_id: non_empty("user_id", user_id)?,
        })
    }

    pub fn user_repositories(user_id: &str) -> Result<Self> {
        Ok(PackageRequest::UserRepositories {
            user_id: validate::path_id("user_id", user_id)?.to_string(),
        })
    }
}

impl BackendCall for PackageRequest {
    fn method(&self) -> Method {
        match self {
            PackageRequest::PackageStatus { .. }
            | PackageRequest::VersionStatus { .. }
            | PackageRequest::UserRepositories { .. } => Method::GET,
            PackageRequest::InitPackage { .. } | PackageRequest::InitRepository { .. } => {
                Method::POST
            }
        }
    }

    fn path(&self) -> String {
        match self {
            PackageRequest::PackageStatus {
                node_type,
                package_name,
            } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("node_type", node_type.as_str())
                    .append_pair("package_name", package_name)
                    .finish();
                format!("{}?{}", PACKAGE_STATUS_PATH, query)
            }
            PackageRequest::VersionStatus {
                node_type,
                package_name,
                version_name,
            } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("node_type", node_type.as_str())
                    .append_pair("package_name", package_name)
                    .append_pair("version_name", version_name)
                    .finish();
                format!("{}?{}", VERSION_STATUS_PATH, query)
            }
            PackageRequest::InitPackage { .. } => PACKAGE_INIT_PATH.to_string(),
            PackageRequest::InitRepository { .. } => REPOSITORY_INIT_PATH.to_string(),
            PackageRequest::UserRepositories { user_id } => {
                format!("{}/{}", USER_REPOSITORIES_PATH, user_id)
            }
        }
    }

    fn body(&self) -> Result<Option<Value>> {
        Ok(match self {
            PackageRequest::InitPackage {
                node_type,
                package_name,
            } => Some(json!({
                "node_type": node_type.as_str(),
                "package_name": package_name,
            })),
            PackageRequest::InitRepository {
                owner,
                name,
                user_id,
            } => Some(json!({
                "owner": owner,
                "name": name,
                "user_id": user_id,
            })),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_query_is_encoded() {
        let request = PackageRequest::version_status(NodeType::NPMPackage, "@types/node", "1.0 rc")
            .unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(
            request.path(),
            "/depex/version/status?node_type=NPMPackage&package_name=%40types%2Fnode&version_name=1.0+rc"
        );
        assert_eq!(request.body().unwrap(), None);
    }

    #[test]
    fn test_version_is_not_an_ecosystem() {
        assert!(PackageRequest::package_status(NodeType::Version, "requests").is_err());
    }

    #[test]
    fn test_blank_names_rejected() {
        assert!(PackageRequest::init_package(NodeType::PyPIPackage, "  ").is_err());
        assert!(PackageRequest::init_repository("securechain", "", "u1").is_err());
    }

    #[test]
    fn test_init_repository_body() {
        let request = PackageRequest::init_repository("securechain", "depex", "u1").unwrap();
        assert_eq!(request.path(), REPOSITORY_INIT_PATH);
        assert_eq!(
            request.body().unwrap().unwrap(),
            json!({"owner": "securechain", "name": "depex", "user_id": "u1"})
        );
    }

    #[test]
    fn test_user_id_cannot_escape_path() {
        assert!(PackageRequest::user_repositories("../auth").is_err());
        assert_eq!(
            PackageRequest::user_repositories("abc-123").unwrap().path(),
            "/depex/repositories/abc-123"
        );
    }
}
