//! Read-only data sources

use ciphertrust_client::CmClient;
use ciphertrust_client::constants::DEFAULT_PAGE_LIMIT;
use ciphertrust_plugin::{Attribute, DynamicDataSource};

pub mod groups_list;
pub mod keys_list;
pub mod local_ca_list;
pub mod system_info;
pub mod users_list;

pub fn all() -> Vec<Box<dyn DynamicDataSource<CmClient>>> {
    vec![
        Box::new(local_ca_list::LocalCaListDataSource),
        Box::new(users_list::UsersListDataSource),
        Box::new(groups_list::GroupsListDataSource),
        Box::new(keys_list::KeysListDataSource),
        Box::new(system_info::SystemInfoDataSource),
    ]
}

/// Page size for a listing; unset or non-positive means the appliance maximum
pub fn page_limit(limit: Option<i64>) -> i64 {
    limit.filter(|limit| *limit > 0).unwrap_or(DEFAULT_PAGE_LIMIT)
}

pub fn limit_attribute() -> Attribute {
    Attribute::number("limit")
        .optional()
        .description("Maximum number of entries to return.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_page_limit() {
        assert_eq!(page_limit(None), DEFAULT_PAGE_LIMIT);
        assert_eq!(page_limit(Some(0)), DEFAULT_PAGE_LIMIT);
        assert_eq!(page_limit(Some(25)), 25);
    }

    #[test]
    fn test_type_names_are_unique() {
        let names: Vec<_> = all().iter().map(|ds| ds.type_name()).collect();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len());
        assert!(names.iter().all(|name| name.starts_with("ciphertrust_cm_")));
    }
}
