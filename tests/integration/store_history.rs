//! Valuation history across store reopenings.

use std::path::PathBuf;
use uuid::Uuid;

use axioma::storage::ValuationStore;
use axioma::types::{AxiomaError, ValuationInputs};
use axioma::valuation::projection::WhatIf;
use axioma::valuation::Valuator;

fn temp_path() -> PathBuf {
    std::env::temp_dir().join(format!("axioma_history_{}.json", Uuid::new_v4()))
}

fn make_inputs(owner_dependency: f64) -> ValuationInputs {
    ValuationInputs {
        monthly_ebitda: 25_000.0,
        sector_multiple: 5.0,
        annual_growth: 12.0,
        owner_dependency,
        governance_score: 6.0,
        net_debt: 100_000.0,
    }
}

#[test]
fn test_history_survives_reopen() {
    let path = temp_path();
    let mut valuator = Valuator::default();

    let company_id = {
        let mut store = ValuationStore::open(&path).unwrap();
        let company = store.create_company("Metalúrgica Sul", Some("Industry"), None).unwrap();
        for dependency in [90.0, 60.0] {
            let inputs = make_inputs(dependency);
            let results = valuator.compute(&inputs);
            store.save_valuation(company.id, inputs, results).unwrap();
        }
        company.id
    };

    let mut store = ValuationStore::open(&path).unwrap();
    let inputs = WhatIf::Decentralization.apply(&make_inputs(60.0));
    let results = valuator.compute(&inputs);
    store.save_valuation(company_id, inputs, results).unwrap();

    let history = store.list_valuations(company_id).unwrap();
    let versions: Vec<u32> = history.iter().map(|v| v.version).collect();
    assert_eq!(versions, vec![3, 2, 1]);
    assert_eq!(history[0].inputs.owner_dependency, 40.0);
    // Less dependency, more value
    assert!(history[0].results.enterprise_value > history[2].results.enterprise_value);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_versions_do_not_repeat_after_delete() {
    let path = temp_path();
    let mut store = ValuationStore::open(&path).unwrap();
    let mut valuator = Valuator::default();
    let company = store.create_company("Clínica Norte", None, None).unwrap();

    let inputs = make_inputs(30.0);
    let results = valuator.compute(&inputs);
    let first = store.save_valuation(company.id, inputs, results).unwrap();
    let second = store.save_valuation(company.id, inputs, results).unwrap();
    store.delete_valuation(first.id).unwrap();
    let third = store.save_valuation(company.id, inputs, results).unwrap();

    assert_eq!(second.version, 2);
    assert_eq!(third.version, 3);
    assert_eq!(valuator.cache_stats().misses, 1);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_deleted_company_is_gone_after_reopen() {
    let path = temp_path();
    let mut store = ValuationStore::open(&path).unwrap();
    let company = store.create_company("Transportadora", None, Some("00.000.000/0001-00")).unwrap();
    let inputs = make_inputs(50.0);
    store
        .save_valuation(company.id, inputs, axioma::valuation::compute(&inputs))
        .unwrap();
    store.delete_company(company.id).unwrap();

    let reopened = ValuationStore::open(&path).unwrap();
    assert!(reopened.list_companies().is_empty());
    let err = reopened.list_valuations(company.id).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AxiomaError>(),
        Some(AxiomaError::CompanyNotFound(_))
    ));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_overflowing_valuation_keeps_store_readable() {
    let path = temp_path();
    let mut store = ValuationStore::open(&path).unwrap();
    let company = store.create_company("Gigante", None, None).unwrap();
    let mut valuator = Valuator::default();

    let ok = make_inputs(30.0);
    store.save_valuation(company.id, ok, valuator.compute(&ok)).unwrap();

    let huge = ValuationInputs {
        monthly_ebitda: 1e307,
        sector_multiple: 10.0,
        ..make_inputs(30.0)
    };
    assert!(huge.is_finite());
    let results = valuator.compute(&huge);
    assert!(!results.is_finite());
    let err = store.save_valuation(company.id, huge, results).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AxiomaError>(),
        Some(AxiomaError::InvalidInput(_))
    ));

    let reopened = ValuationStore::open(&path).unwrap();
    assert_eq!(reopened.list_companies().len(), 1);
    assert_eq!(reopened.list_valuations(company.id).unwrap().len(), 1);

    let _ = std::fs::remove_file(&path);
}
