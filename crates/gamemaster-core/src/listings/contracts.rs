//! Contract listings.

use gamemaster_types::{Contract, ContractKey, ContractStatus, Provider, ProviderType, UserId};

use crate::query::filter_by_condition;
use crate::store::EntityStore;

/// Contracts where the provider is either party.
pub fn involving(contracts: &[Contract], provider: UserId) -> Vec<Contract> {
    filter_by_condition(contracts, |c| c.contract_key().involves(provider))
}

/// Contracts in one status.
pub fn with_status(contracts: &[Contract], status: ContractStatus) -> Vec<Contract> {
    filter_by_condition(contracts, |c| c.status == status)
}

/// Developers the publisher has no contract with yet, in key order.
pub fn candidate_developers(store: &EntityStore, publisher: UserId) -> Vec<Provider> {
    store
        .iter::<Provider>()
        .filter(|p| p.provider_type == ProviderType::Developer)
        .filter(|p| !store.contains::<Contract>(ContractKey::new(p.profile.id, publisher)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use gamemaster_types::Profile;

    use super::*;

    fn contract(developer: i32, publisher: i32, status: ContractStatus) -> Contract {
        Contract {
            developer_id: UserId(developer),
            publisher_id: UserId(publisher),
            status,
            start_date: NaiveDate::MIN,
            end_date: NaiveDate::MIN,
        }
    }

    fn provider(id: i32, provider_type: ProviderType) -> Provider {
        Provider {
            profile: Profile {
                id: UserId(id),
                username: format!("provider{id}"),
                password: "pw".to_owned(),
                email: None,
                banned: false,
            },
            website: None,
            provider_type,
        }
    }

    #[test]
    fn involving_matches_either_side() {
        let contracts = [
            contract(3, 5, ContractStatus::Pending),
            contract(4, 6, ContractStatus::Accepted),
            contract(3, 6, ContractStatus::Accepted),
        ];
        assert_eq!(involving(&contracts, UserId(3)).len(), 2);
        assert_eq!(involving(&contracts, UserId(6)).len(), 2);
        assert_eq!(with_status(&contracts, ContractStatus::Pending).len(), 1);
    }

    #[test]
    fn candidates_exclude_contracted_developers() {
        let mut store = EntityStore::new();
        store.put(provider(3, ProviderType::Developer));
        store.put(provider(4, ProviderType::Developer));
        store.put(provider(5, ProviderType::Publisher));
        store.put(contract(3, 5, ContractStatus::Pending));

        let ids: Vec<_> = candidate_developers(&store, UserId(5))
            .iter()
            .map(|p| p.profile.id)
            .collect();
        assert_eq!(ids, vec![UserId(4)]);
    }
}
