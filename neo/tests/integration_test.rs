//! End-to-end checks driven by the YAML files under tests/data

use neo::app::{
    build_geometry, build_system, interaction_energy, load_config, BasisRegistry, NeoSystem,
    NwchemFileLoader,
};
use neo::{ComponentKind, PotentialMatrix};
use std::collections::BTreeMap;
use std::path::PathBuf;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
}

fn system_from(file: &str) -> NeoSystem {
    let config = load_config(&data_dir().join(file)).unwrap();
    let geometry = build_geometry(&config).unwrap();
    let mut registry = BasisRegistry::new(NwchemFileLoader::new(data_dir()));
    build_system(&config, &geometry, &mut registry).unwrap()
}

fn potentials(system: &NeoSystem) -> BTreeMap<ComponentKind, PotentialMatrix> {
    system.ks.get_vint(&system.densities).unwrap()
}

#[test]
fn test_h2_epc17_tags_both_components() {
    let system = system_from("h2_epc.yaml");
    assert_eq!(system.ks.components().len(), 2);
    assert_eq!(system.ks.interactions().len(), 1);

    let vint = potentials(&system);
    let v_e = &vint[&ComponentKind::Electron];
    let v_n = &vint[&ComponentKind::Nucleus(1)];
    assert_eq!(v_e.matrix.shape(), (2, 2));
    assert_eq!(v_n.matrix.shape(), (2, 2));
    assert!(v_e.is_tagged() && v_n.is_tagged());

    let e_epc = v_e.correlation_energy();
    assert!(e_epc < 0.0);
    assert!((e_epc - v_n.correlation_energy()).abs() < 1e-14);

    assert!((&v_e.matrix - v_e.matrix.transpose()).amax() < 1e-12);
    assert!((&v_n.matrix - v_n.matrix.transpose()).amax() < 1e-12);

    let energy = interaction_energy(&vint, &system.densities);
    // electron-proton attraction
    assert!(energy.coulomb < 0.0);
    assert!((energy.correlation - e_epc).abs() < 1e-14);
    assert!(energy.total() < energy.coulomb);
}

#[test]
fn test_epc_restricted_to_other_nucleus_is_pure_coulomb() {
    let system = system_from("h2_epc18_restricted.yaml");
    let vint = potentials(&system);
    assert!(vint.values().all(|v| !v.is_tagged()));

    let energy = interaction_energy(&vint, &system.densities);
    assert!(energy.coulomb < 0.0);
    assert_eq!(energy.correlation, 0.0);
}

#[test]
fn test_unrestricted_and_restricted_inputs_agree_on_coulomb() {
    let tagged = system_from("h2_epc.yaml");
    let plain = system_from("h2_epc18_restricted.yaml");
    let e_tagged = interaction_energy(&potentials(&tagged), &tagged.densities);
    let e_plain = interaction_energy(&potentials(&plain), &plain.densities);
    // same total densities, so the Coulomb part is unchanged by EPC
    assert!((e_tagged.coulomb - e_plain.coulomb).abs() < 1e-10);
}

#[test]
fn test_missing_config_file() {
    assert!(load_config(&data_dir().join("missing.yaml")).is_err());
}
