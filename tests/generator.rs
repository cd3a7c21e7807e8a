#![forbid(unsafe_code)]
use tabel::{
    Cell, GroupTag, NumericRule, RosterBuilder, ScheduleGenerator, ShiftTemplate, TemplateId,
    TemplateRegistry, TimesheetConfig, TimesheetError, Worker,
};

fn h(x: f64) -> Cell {
    Cell::Hours(x)
}

fn sample_registry() -> TemplateRegistry {
    TemplateRegistry::new(vec![
        ShiftTemplate::new("short", vec![h(11.5), h(11.5), Cell::empty(), h(11.5)]),
        ShiftTemplate::new("office", vec![h(8.0); 5]),
    ])
    .unwrap()
}

fn worker(name: &str, template: &str) -> Worker {
    Worker::new(name, GroupTag::new("ГР1"), TemplateId::new(template))
}

#[test]
fn cycles_template_without_overrides() {
    let registry = sample_registry();
    let gen = ScheduleGenerator::new(&registry, 8, 160.0);
    let record = gen.generate(&worker("alice", "short")).unwrap();

    let expected = vec![
        h(11.5),
        h(11.5),
        Cell::empty(),
        h(11.5),
        h(11.5),
        h(11.5),
        Cell::empty(),
        h(11.5),
    ];
    assert_eq!(record.schedule().cells(), expected.as_slice());
    assert_eq!(record.fact_hours(), 69.0);
    assert_eq!(record.deviation(), -91.0);
}

#[test]
fn day_i_matches_template_modulo_length() {
    let config = TimesheetConfig::load_or_default(None::<&str>).unwrap();
    let registry = config.registry().unwrap();
    let gen = config.generator(&registry);

    for template in &config.templates {
        let record = gen.generate(&worker("plain", template.id.as_str())).unwrap();
        assert_eq!(record.schedule().len(), usize::from(config.days_in_month));
        for (day, cell) in record.schedule().days() {
            let expected = &template.slots[(usize::from(day) - 1) % template.slots.len()];
            assert_eq!(cell, expected, "template {} day {day}", template.id.as_str());
        }
    }
}

#[test]
fn exception_does_not_consume_template_slot() {
    let registry = sample_registry();
    let gen = ScheduleGenerator::new(&registry, 8, 160.0);
    let record = gen
        .generate(&worker("bob", "short").with_exception(3, "ГО"))
        .unwrap();

    // jours 1,2,4..8 -> positions 0,1,2,3,0,1,2
    let expected = vec![
        h(11.5),
        h(11.5),
        Cell::marker("ГО"),
        Cell::empty(),
        h(11.5),
        h(11.5),
        h(11.5),
        Cell::empty(),
    ];
    assert_eq!(record.schedule().cells(), expected.as_slice());
    assert_eq!(record.fact_hours(), 57.5);
    assert_eq!(record.deviation(), -102.5);
}

#[test]
fn non_overridden_days_follow_pattern_without_drift() {
    let registry = sample_registry();
    let gen = ScheduleGenerator::new(&registry, 28, 160.0);
    let pattern = registry.lookup(&TemplateId::new("short")).unwrap();
    let plain = gen.generate(&worker("carol", "short")).unwrap();

    for d in 1..=28u8 {
        let overridden = gen
            .generate(&worker("carol", "short").with_absence(d, "б/л"))
            .unwrap();
        assert_eq!(overridden.cell(d), Some(&Cell::marker("б/л")));

        // avant le jour surchargé, rien ne change
        for before in 1..d {
            assert_eq!(overridden.cell(before), plain.cell(before));
        }
        // les jours restants reprennent le gabarit là où il s'était arrêté
        let rest: Vec<&Cell> = overridden
            .schedule()
            .days()
            .filter(|(day, _)| *day != d)
            .map(|(_, c)| c)
            .collect();
        for (i, cell) in rest.iter().enumerate() {
            assert_eq!(*cell, &pattern[i % pattern.len()]);
        }
    }
}

#[test]
fn exception_takes_precedence_over_absence() {
    let registry = sample_registry();
    let gen = ScheduleGenerator::new(&registry, 8, 160.0);
    let w = worker("dan", "short")
        .with_exception(2, "ГО")
        .with_absence(2, "б/л")
        .with_absence(5, "ув");
    let record = gen.generate(&w).unwrap();
    assert_eq!(record.cell(2), Some(&Cell::marker("ГО")));
    assert_eq!(record.cell(5), Some(&Cell::marker("ув")));
}

#[test]
fn markers_everywhere_yield_zero_total() {
    let registry = sample_registry();
    let gen = ScheduleGenerator::new(&registry, 8, 160.0);
    let w = (1..=8u8).fold(worker("eve", "office"), |w, d| w.with_exception(d, "ув"));
    let record = gen.generate(&w).unwrap();
    assert_eq!(record.fact_hours(), 0.0);
    assert_eq!(record.deviation(), -160.0);
}

#[test]
fn numeric_override_strings_count_as_hours() {
    let registry = sample_registry();
    let gen = ScheduleGenerator::new(&registry, 5, 160.0);
    let record = gen
        .generate(&worker("fay", "office").with_exception(1, "4"))
        .unwrap();
    assert_eq!(record.cell(1), Some(&h(4.0)));
    assert_eq!(record.fact_hours(), 4.0 + 8.0 * 4.0);
}

#[test]
fn loose_rule_ignores_negative_hours() {
    let registry = sample_registry();
    let w = worker("gus", "office").with_exception(1, "-3").with_exception(2, "1e1");

    let loose = ScheduleGenerator::new(&registry, 5, 160.0)
        .generate(&w)
        .unwrap();
    assert_eq!(loose.cell(1), Some(&Cell::marker("-3")));
    assert_eq!(loose.cell(2), Some(&Cell::marker("1e1")));
    assert_eq!(loose.fact_hours(), 24.0);

    let strict = ScheduleGenerator::new(&registry, 5, 160.0)
        .with_numeric_rule(NumericRule::Strict)
        .generate(&w)
        .unwrap();
    assert_eq!(strict.cell(1), Some(&h(-3.0)));
    assert_eq!(strict.cell(2), Some(&h(10.0)));
    assert_eq!(strict.fact_hours(), 24.0 - 3.0 + 10.0);
}

#[test]
fn loose_rule_sniffs_edited_cells_textually() {
    let registry = sample_registry();
    let mut record = ScheduleGenerator::new(&registry, 5, 160.0)
        .generate(&worker("hal", "office"))
        .unwrap();
    record.set_cell(1, Cell::marker("4")).unwrap();
    record.set_cell(2, h(-8.0)).unwrap();
    // "4" compte, -8 non : le signe échoue au test de chiffres
    assert_eq!(record.fact_hours(), 4.0 + 8.0 * 3.0);
    assert_eq!(record.deviation(), 28.0 - 160.0);
}

#[test]
fn set_cell_rejects_out_of_range_days() {
    let registry = sample_registry();
    let mut record = ScheduleGenerator::new(&registry, 5, 160.0)
        .generate(&worker("ivy", "office"))
        .unwrap();
    let err = record.set_cell(6, Cell::empty()).unwrap_err();
    assert_eq!(
        err,
        TimesheetError::DayOutOfRange {
            day: 6,
            days_in_month: 5
        }
    );
    assert!(record.set_cell(0, Cell::empty()).is_err());
}

#[test]
fn generate_is_idempotent() {
    let registry = sample_registry();
    let gen = ScheduleGenerator::new(&registry, 28, 160.0);
    let w = worker("jo", "short").with_exception(7, "ГО").with_absence(9, "ув");
    assert_eq!(gen.generate(&w).unwrap(), gen.generate(&w).unwrap());
}

#[test]
fn unknown_template_is_an_error() {
    let registry = sample_registry();
    let gen = ScheduleGenerator::new(&registry, 28, 160.0);
    let err = gen.generate(&worker("kim", "missing")).unwrap_err();
    assert_eq!(err, TimesheetError::UnknownTemplate("missing".into()));
}

#[test]
fn builder_preserves_order_and_fails_fast() {
    let registry = sample_registry();
    let builder = RosterBuilder::new(ScheduleGenerator::new(&registry, 28, 160.0));

    let table = builder
        .build(&[worker("zed", "office"), worker("amy", "short")])
        .unwrap();
    let names: Vec<&str> = table.rows.iter().map(|r| r.worker.as_str()).collect();
    assert_eq!(names, ["zed", "amy"]);
    assert_eq!(table.days_in_month, 28);

    let err = builder
        .build(&[worker("a", "office"), worker("b", "nope"), worker("c", "other")])
        .unwrap_err();
    assert_eq!(err, TimesheetError::UnknownTemplate("nope".into()));
}

#[test]
fn registry_rejects_bad_templates() {
    assert!(matches!(
        TemplateRegistry::new(vec![ShiftTemplate::new("empty", vec![])]),
        Err(TimesheetError::InvalidTemplate { .. })
    ));
    assert!(matches!(
        TemplateRegistry::new(vec![ShiftTemplate::new("neg", vec![h(-1.0)])]),
        Err(TimesheetError::InvalidTemplate { .. })
    ));
    assert!(matches!(
        TemplateRegistry::new(vec![ShiftTemplate::new("code", vec![Cell::marker("ГО")])]),
        Err(TimesheetError::InvalidTemplate { .. })
    ));
    assert_eq!(
        TemplateRegistry::new(vec![
            ShiftTemplate::new("dup", vec![h(8.0)]),
            ShiftTemplate::new("dup", vec![h(4.0)]),
        ])
        .unwrap_err(),
        TimesheetError::DuplicateTemplate("dup".into())
    );
}

#[test]
fn default_roster_totals() {
    let config = TimesheetConfig::load_or_default(None::<&str>).unwrap();
    let table = config.build_table().unwrap();
    assert_eq!(table.len(), 24);

    let first = &table.rows[0];
    assert_eq!(first.worker, "Феоктистова Е.А.");
    assert_eq!(first.cell(12), Some(&Cell::marker("ГО")));
    assert_eq!(first.cell(27), Some(&h(4.0)));
    assert_eq!(first.fact_hours(), 188.0);
    assert_eq!(first.deviation(), 28.0);

    let office = table.find_by_worker("Подгорбунский Д.А.").unwrap();
    assert_eq!(office.fact_hours(), 224.0);

    let trainee = table.find_by_worker("Свиридов А.О. (стажер)").unwrap();
    assert_eq!(trainee.fact_hours(), 206.5);
    assert_eq!(trainee.deviation(), 46.5);

    for row in &table.rows {
        let expected = ((row.fact_hours() - 160.0) * 10.0).round() / 10.0;
        assert_eq!(row.deviation(), expected, "{}", row.worker);
    }
}

#[test]
fn fact_rounds_half_to_even_on_exact_value() {
    let registry = sample_registry();
    let gen = ScheduleGenerator::new(&registry, 1, 160.0);
    let fact = |raw: &str| {
        let record = gen
            .generate(&worker("lea", "office").with_exception(1, raw))
            .unwrap();
        (record.fact_hours(), record.deviation())
    };

    assert_eq!(fact("0.25"), (0.2, -159.8));
    assert_eq!(fact("0.35"), (0.3, -159.7));
    assert_eq!(fact("0.45"), (0.5, -159.6));
    assert_eq!(fact("2.675"), (2.7, -157.3));
}

#[test]
fn loose_rule_only_counts_ascii_digits() {
    let registry = sample_registry();
    let record = ScheduleGenerator::new(&registry, 1, 160.0)
        .generate(&worker("max", "office").with_exception(1, "٣"))
        .unwrap();
    assert_eq!(record.cell(1), Some(&Cell::marker("٣")));
    assert_eq!(record.fact_hours(), 0.0);
}
