use ce_envelope::{Envelope, EnvelopeField, HeatPumpParameters};
use ce_sweep::ExclusionSet;
use ce_table::{
    BoundaryDomain, EnvelopeTable, InterpolationKind, InterpolationSettings, RowOrigin, SampleTable, TableError,
};
use proptest::prelude::*;

fn env(p_max: f64, p_min: f64) -> Envelope {
    Envelope {
        p_max_wo_dh: p_max,
        p_min_wo_dh: p_min,
        eta_el_max: 0.45,
        eta_el_min: 0.38,
        h_l_fg_share_max: 0.10,
        h_l_fg_share_min: 0.25,
        q_cw_min: 4.0e6,
        beta: 0.14,
        q_in: p_max / 0.45,
    }
}

fn three_samples() -> SampleTable {
    SampleTable::from_samples(
        [(70, env(100e6, 50e6)), (90, env(96e6, 48e6)), (110, env(90e6, 46e6))],
        &ExclusionSet::new(),
    )
    .unwrap()
}

#[test]
fn sampled_rows_are_kept_verbatim() {
    let samples = three_samples();
    let table = EnvelopeTable::interpolate(
        &samples,
        BoundaryDomain::new(65, 125).unwrap(),
        &ExclusionSet::new(),
        &InterpolationSettings::default(),
    )
    .unwrap();

    assert_eq!(table.len(), 61);
    for (key, sample) in samples.iter() {
        let row = table.get(key).unwrap();
        assert_eq!(row.origin, RowOrigin::Sampled);
        assert_eq!(&row.envelope, sample);
    }
    assert_eq!(table.get(71).unwrap().origin, RowOrigin::Interpolated);
}

#[test]
fn extrapolated_rows_are_finite() {
    for kind in [InterpolationKind::Pchip, InterpolationKind::NaturalCubic] {
        let table = EnvelopeTable::interpolate(
            &three_samples(),
            BoundaryDomain::new(65, 125).unwrap(),
            &ExclusionSet::new(),
            &InterpolationSettings {
                kind,
                fill_excluded: true,
            },
        )
        .unwrap();
        for key in [65, 120, 125] {
            let env = table.envelope(key).unwrap();
            assert!(env.values().iter().all(|v| v.is_finite()));
            assert!(env.p_max_wo_dh >= env.p_min_wo_dh);
        }
    }
}

#[test]
fn excluded_value_never_becomes_a_key_by_default() {
    let ex = ExclusionSet::new().with_values([90]);
    let samples = SampleTable::from_samples(
        [(70, env(100e6, 50e6)), (90, env(1e6, 0.5e6)), (110, env(90e6, 46e6))],
        &ex,
    )
    .unwrap();
    assert!(samples.get(90).is_none());

    let omitted = EnvelopeTable::interpolate(
        &samples,
        BoundaryDomain::new(70, 110).unwrap(),
        &ex,
        &InterpolationSettings::default(),
    )
    .unwrap();
    assert!(omitted.get(90).is_none());
    assert_eq!(omitted.len(), 40);
}

#[test]
fn excluded_value_filled_on_request() {
    let ex = ExclusionSet::new().with_values([90]);
    let samples = SampleTable::from_samples(
        [(70, env(100e6, 50e6)), (90, env(1e6, 0.5e6)), (110, env(90e6, 46e6))],
        &ex,
    )
    .unwrap();

    let filled = EnvelopeTable::interpolate(
        &samples,
        BoundaryDomain::new(70, 110).unwrap(),
        &ex,
        &InterpolationSettings {
            kind: InterpolationKind::Pchip,
            fill_excluded: true,
        },
    )
    .unwrap();
    let row = filled.get(90).unwrap();
    assert_eq!(row.origin, RowOrigin::Interpolated);
    assert!(row.envelope.p_max_wo_dh > 90e6);
    assert_eq!(filled.len(), 41);
}

#[test]
fn sampled_row_violating_invariants_is_rejected() {
    let broken = Envelope {
        p_min_wo_dh: 120e6,
        ..env(100e6, 50e6)
    };
    let samples =
        SampleTable::from_samples([(70, env(100e6, 50e6)), (90, broken)], &ExclusionSet::new()).unwrap();
    let err = EnvelopeTable::interpolate(
        &samples,
        BoundaryDomain::new(90, 95).unwrap(),
        &ExclusionSet::new(),
        &InterpolationSettings::default(),
    )
    .unwrap_err();
    match err {
        TableError::InvalidRow { key, source } => {
            assert_eq!(key, 90);
            assert_eq!(source.field, EnvelopeField::PMaxWoDh.name());
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn heat_pump_rows_share_the_table_path() {
    let hp = |p_max: f64, cop: f64| HeatPumpParameters {
        p_max,
        p_min: 0.3 * p_max,
        c_1: cop,
        c_0: 0.0,
        cop,
    };
    let ex = ExclusionSet::new().with_values([100]);
    let samples = SampleTable::from_samples([(70, hp(2.0e6, 5.0)), (100, hp(2.4e6, 4.2)), (120, hp(2.9e6, 3.5))], &ex)
        .unwrap();
    let table = EnvelopeTable::interpolate(
        &samples,
        BoundaryDomain::new(70, 120).unwrap(),
        &ex,
        &InterpolationSettings::default(),
    )
    .unwrap();

    assert_eq!(table.len(), 50);
    assert!(table.get(100).is_none());
    let mid = table.envelope(95).unwrap();
    assert!(mid.cop < 5.0 && mid.cop > 3.5);
    assert!(mid.p_max > 2.0e6 && mid.p_max < 2.9e6);
    assert_eq!(table.get(120).unwrap().origin, RowOrigin::Sampled);
}

#[test]
fn aggressive_extrapolation_is_an_invalid_row() {
    // P_min falls linearly and crosses zero at 100.
    let samples = SampleTable::from_samples(
        [(70, env(100e6, 30e6)), (80, env(100e6, 20e6)), (90, env(100e6, 10e6))],
        &ExclusionSet::new(),
    )
    .unwrap();
    let err = EnvelopeTable::interpolate(
        &samples,
        BoundaryDomain::new(70, 105).unwrap(),
        &ExclusionSet::new(),
        &InterpolationSettings::default(),
    )
    .unwrap_err();
    match err {
        TableError::InvalidRow { key, source } => {
            assert_eq!(key, 101);
            assert_eq!(source.field, EnvelopeField::PMinWoDh.name());
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn single_sample_cannot_be_interpolated() {
    let samples = SampleTable::from_samples([(70, env(100e6, 50e6))], &ExclusionSet::new()).unwrap();
    let err = EnvelopeTable::interpolate(
        &samples,
        BoundaryDomain::new(70, 80).unwrap(),
        &ExclusionSet::new(),
        &InterpolationSettings::default(),
    )
    .unwrap_err();
    assert_eq!(err, TableError::TooFewSamples { needed: 2, got: 1 });
}

proptest! {
    #[test]
    fn pchip_stays_between_monotone_samples(
        y0 in 50.0f64..100.0,
        rise1 in 0.0f64..20.0,
        rise2 in 0.0f64..20.0,
        query in 71i32..110,
    ) {
        let y1 = y0 + rise1;
        let y2 = y1 + rise2;
        let samples = SampleTable::from_samples(
            [(70, env(y0, 10.0)), (90, env(y1, 10.0)), (110, env(y2, 10.0))],
            &ExclusionSet::new(),
        )
        .unwrap();
        let table = EnvelopeTable::interpolate(
            &samples,
            BoundaryDomain::new(60, 120).unwrap(),
            &ExclusionSet::new(),
            &InterpolationSettings::default(),
        )
        .unwrap();

        let (lo, hi) = if query <= 90 { (y0, y1) } else { (y1, y2) };
        let v = table.envelope(query).unwrap().p_max_wo_dh;
        prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        prop_assert!(table.envelope(60).unwrap().p_max_wo_dh.is_finite());
        prop_assert!(table.envelope(120).unwrap().p_max_wo_dh.is_finite());
    }
}
