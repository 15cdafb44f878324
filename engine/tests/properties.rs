use proptest::prelude::*;
use sheetkeeper::{ability_mod, Ability, CharacterRecord, Dice, DiceExpr, Skill};

proptest! {
    #[test]
    fn modifier_is_floor_of_half_offset(score in 1i32..=30) {
        let expected = ((score - 10) as f64 / 2.0).floor() as i32;
        prop_assert_eq!(ability_mod(score), expected);
    }

    #[test]
    fn out_of_range_scores_keep_the_old_value(score in prop_oneof![-100i32..1, 31i32..200]) {
        let mut c = CharacterRecord::new();
        c.set_score(Ability::Wis, 14).unwrap();
        prop_assert!(c.set_score(Ability::Wis, score).is_err());
        prop_assert_eq!(c.score(Ability::Wis), 14);
    }

    #[test]
    fn well_formed_weapon_damage_round_trips(
        dice in prop::collection::vec((1u32..10, 1u32..=20), 1..4),
        bonus in prop::option::of(0i64..10),
    ) {
        let mut tokens: Vec<String> = dice.iter().map(|(n, s)| format!("{n}d{s}")).collect();
        if let Some(b) = bonus {
            tokens.push(b.to_string());
        }
        let text = tokens.join(" ");
        let mut c = CharacterRecord::new();
        c.set_weapon_damage(&text).unwrap();
        prop_assert_eq!(c.weapon_damage().to_string(), text);
    }

    #[test]
    fn letter_terms_are_rejected(word in "[a-ce-z]{1,8}") {
        let mut c = CharacterRecord::new();
        let before = c.weapon_damage().clone();
        let text = format!("1d8 {word}");
        prop_assert!(c.set_weapon_damage(&text).is_err());
        prop_assert_eq!(c.weapon_damage(), &before);
    }

    #[test]
    fn seeded_rolls_land_on_a_face(seed in any::<u64>(), count in 1u32..6, sides in 1u32..=100) {
        let mut dice = Dice::from_seed(seed);
        let roll = DiceExpr::dice(count, sides).roll(&mut dice, false);
        for r in &roll.terms[0].rolls {
            prop_assert!((1..=sides).contains(r));
        }
        prop_assert!(roll.total >= i64::from(count));
        prop_assert!(roll.total <= i64::from(count * sides));
    }

    #[test]
    fn expertise_always_implies_proficiency(idx in 0usize..Skill::ALL.len()) {
        let skill = Skill::ALL[idx];
        let mut c = CharacterRecord::new();
        c.add_expertise(skill.name()).unwrap();
        prop_assert!(c.has_proficiency(skill.name()));
        prop_assert!(c.remove_proficiency(skill.name()).is_err());
        prop_assert!(c.has_expertise(skill.name()));
    }
}
