use sheetkeeper::{Ability, CharacterRecord, CharacterStore, FsStore, MemoryStore, PersistedCharacter, StoreError};

fn sample() -> CharacterRecord {
    let mut c = CharacterRecord::named("test_character");
    c.set_score(Ability::Str, 15).unwrap();
    c.set_score(Ability::Dex, 14).unwrap();
    c.set_score(Ability::Con, 13).unwrap();
    c.set_score(Ability::Wis, 12).unwrap();
    c.set_score(Ability::Int, 11).unwrap();
    c.set_weapon_damage("1d8 3").unwrap();
    c.set_armor_class(16).unwrap();
    c.set_health(27).unwrap();
    c.set_proficiency_bonus(3).unwrap();
    c.add_proficiency("Athletics").unwrap();
    c.add_proficiency("Acrobatics").unwrap();
    c.add_expertise("Stealth").unwrap();
    c
}

#[test]
fn fs_round_trip_preserves_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FsStore::new(dir.path().join("characters"));
    let original = sample();

    assert!(!store.exists("test_character").unwrap());
    store.save("test_character", &original).unwrap();
    assert!(store.exists("test_character").unwrap());

    let loaded = store.load("test_character").unwrap();
    assert_eq!(loaded, original);
    assert!(loaded.has_expertise("stealth"));
    assert!(loaded.has_proficiency("acrobatics"));
}

#[test]
fn saved_file_uses_flat_camel_case_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FsStore::new(dir.path());
    store.save("hero", &sample()).unwrap();

    let text = std::fs::read_to_string(dir.path().join("hero.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let obj = value.as_object().unwrap();
    let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "armorClass",
            "charisma",
            "constitution",
            "dexterity",
            "expertise",
            "health",
            "intelligence",
            "proficiency",
            "proficiencyBonus",
            "strength",
            "weaponDamage",
            "wisdom",
        ]
    );
    assert_eq!(obj["weaponDamage"], "1d8 3");
    assert_eq!(obj["expertise"], serde_json::json!(["stealth"]));
    assert_eq!(
        obj["proficiency"],
        serde_json::json!(["athletics", "acrobatics", "stealth"])
    );
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());
    assert!(matches!(store.load("ghost"), Err(StoreError::NotFound(n)) if n == "ghost"));
}

#[test]
fn bom_prefixed_files_load() {
    let dir = tempfile::tempdir().unwrap();
    let json = PersistedCharacter::from(&sample()).to_json().unwrap();
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(json.as_bytes());
    std::fs::write(dir.path().join("bom.json"), bytes).unwrap();

    let store = FsStore::new(dir.path());
    assert_eq!(store.load("bom").unwrap().score(Ability::Str), 15);
}

#[test]
fn unreadable_locations_are_errors_not_absence() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "plain file").unwrap();

    let store = FsStore::new(&blocker);
    assert!(matches!(store.exists("hero"), Err(StoreError::Io { .. })));
}

#[test]
fn delete_removes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FsStore::new(dir.path());
    store.save("hero", &sample()).unwrap();
    store.delete("hero").unwrap();
    assert!(!store.exists("hero").unwrap());
    assert!(matches!(store.delete("hero"), Err(StoreError::NotFound(_))));
}

#[test]
fn path_like_names_are_refused() {
    let store = FsStore::new("characters");
    for bad in ["../escape", "a/b", "..", ""] {
        assert!(matches!(store.path_for(bad), Err(StoreError::InvalidName(_))));
    }
}

const LEGACY: &str = r#"{
    "strength": 15, "dexterity": 14, "constitution": 13,
    "wisdom": 12, "intelligence": 11, "charisma": 10,
    "weaponDamage": "1d8 3", "armorClass": 16, "health": 20, "proficiencyBonus": 2,
    "expertise": ["Stealth"], "proficiency": ["Athletics", "Acrobatics"]
}"#;

#[test]
fn load_lowercases_skill_names_and_names_the_record() {
    let mut store = MemoryStore::new();
    store.insert_raw("legacy", LEGACY);
    let c = store.load("legacy").unwrap();
    assert_eq!(c.name(), Some("legacy"));
    assert_eq!(c.proficiencies().collect::<Vec<_>>(), vec!["athletics", "acrobatics", "stealth"]);
    assert_eq!(c.expertise().collect::<Vec<_>>(), vec!["stealth"]);
}

#[test]
fn unknown_or_missing_fields_are_malformed() {
    let mut store = MemoryStore::new();
    store.insert_raw("extra", LEGACY.replace("\"health\": 20", "\"health\": 20, \"mana\": 3"));
    store.insert_raw("short", LEGACY.replace("\"health\": 20, ", ""));
    store.insert_raw("junk", "{not json");
    for name in ["extra", "short", "junk"] {
        assert!(
            matches!(store.load(name), Err(StoreError::Malformed { .. })),
            "{name} should be malformed"
        );
    }
}

#[test]
fn negative_saved_health_loads_as_is() {
    let mut store = MemoryStore::new();
    store.insert_raw("downed", LEGACY.replace("\"health\": 20", "\"health\": -4"));
    assert_eq!(store.load("downed").unwrap().health(), -4);
}

#[test]
fn out_of_range_values_are_invalid() {
    let mut store = MemoryStore::new();
    store.insert_raw("giant", LEGACY.replace("\"strength\": 15", "\"strength\": 31"));
    store.insert_raw("sword", LEGACY.replace("1d8 3", "1d8+3"));
    store.insert_raw("skill", LEGACY.replace("Athletics", "Juggling"));
    for name in ["giant", "sword", "skill"] {
        assert!(
            matches!(store.load(name), Err(StoreError::Invalid { .. })),
            "{name} should be invalid"
        );
    }
}
