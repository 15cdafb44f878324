use sheetkeeper::dice::{MAX_DICE_COUNT, MAX_DICE_SIDES};
use sheetkeeper::{CharacterRecord, DiceError, DiceExpr, DiceTerm, Dice};

#[test]
fn mid_uniform_rolls_middle_faces() {
    let expr: DiceExpr = "2d6 1d4".parse().unwrap();
    let mut dice = Dice::from_uniform(vec![0.5]);
    let res = expr.roll(&mut dice, false);
    assert_eq!(res.terms[0].rolls, vec![4, 4]);
    assert_eq!(res.terms[0].subtotal, 8);
    assert_eq!(res.terms[1].rolls, vec![3]);
    assert_eq!(res.total, 11);
}

#[test]
fn lowest_uniform_rolls_ones() {
    let expr: DiceExpr = "2d4".parse().unwrap();
    let mut dice = Dice::from_uniform(vec![0.1]);
    let text = expr.roll(&mut dice, false).to_string();
    assert!(text.contains("2 (2d4)"));
    assert!(text.contains("Total: 2"));
}

#[test]
fn rendering_groups_terms_the_same_for_one_or_many() {
    let mut dice = Dice::from_uniform(vec![0.5]);
    let many: DiceExpr = "2d6 1d4 3".parse().unwrap();
    insta::assert_snapshot!(many.roll(&mut dice, false).to_string(), @r"
    2d6: 4, 4
    1d4: 3
    8 (2d6) + 3 (1d4) + 3
    Total: 14
    ");

    let single: DiceExpr = "1d20".parse().unwrap();
    insta::assert_snapshot!(single.roll(&mut dice, false).to_string(), @r"
    1d20: 11
    11 (1d20)
    Total: 11
    ");
}

#[test]
fn one_bad_term_fails_the_whole_expression() {
    let err = DiceExpr::from_tokens(["1d10", "invalid", "2d6"]).unwrap_err();
    assert_eq!(err, DiceError::InvalidTerm("invalid".into()));
    assert_eq!(err.to_string(), "Invalid dice format: invalid. Use format: XdY");
    assert_eq!(DiceExpr::from_tokens(std::iter::empty::<&str>()), Err(DiceError::Empty));
}

#[test]
fn display_round_trips_terms() {
    let expr: DiceExpr = "2d4   1d6 3".parse().unwrap();
    assert_eq!(
        expr.terms(),
        &[
            DiceTerm::Dice { count: 2, sides: 4 },
            DiceTerm::Dice { count: 1, sides: 6 },
            DiceTerm::Flat { bonus: 3 },
        ]
    );
    assert_eq!(expr.to_string(), "2d4 1d6 3");
}

#[test]
fn oversized_terms_are_refused() {
    assert_eq!(
        "1000d1000".parse::<DiceTerm>(),
        Ok(DiceTerm::Dice { count: MAX_DICE_COUNT, sides: MAX_DICE_SIDES })
    );
    assert_eq!(
        "1001d6".parse::<DiceTerm>(),
        Err(DiceError::TooLarge("1001d6".into()))
    );
    assert_eq!(
        "1d1001".parse::<DiceTerm>(),
        Err(DiceError::TooLarge("1d1001".into()))
    );
    assert!(matches!(
        "4294967295d6 1".parse::<DiceExpr>(),
        Err(DiceError::TooLarge(_))
    ));

    let mut c = CharacterRecord::new();
    assert!(c.set_weapon_damage("4294967295d6 1").is_err());
    assert_eq!(c.weapon_damage().to_string(), "1d8");
}
