use assert_approx_eq::assert_approx_eq;
use census::{
    clinical::{RateTable, CDC_HOSP_CORRECTION},
    prelude::*,
    projection::project_region,
    report::render_csv,
    series::{default_start_date, ALL_SUBREGIONS},
    tables::read_populations,
};

const CASES: &str = "\
date,state,county,confirmed,deaths
2020-03-08,Minnesota,Hennepin,20,0
2020-03-10,Minnesota,Hennepin,60,0
2020-03-11,Minnesota,Hennepin,72,0
2020-03-12,Minnesota,Hennepin,87,1
2020-03-13,Minnesota,Hennepin,105,1
2020-03-14,Minnesota,Hennepin,126,2
2020-03-15,Minnesota,Hennepin,150,2
2020-03-16,Minnesota,Hennepin,180,3
2020-03-10,Minnesota,Ramsey,40,0
2020-03-11,Minnesota,Ramsey,48,0
2020-03-12,Minnesota,Ramsey,58,0
2020-03-13,Minnesota,Ramsey,70,0
2020-03-14,Minnesota,Ramsey,84,1
2020-03-16,Minnesota,Ramsey,120,1
";

const POPULATIONS: &str = "\
state,county,0,5,10,15,20,25,30,35,40,45,50,55,60,65,70,75,80,85
Minnesota,Hennepin,30000,30000,30000,30000,30000,30000,30000,30000,30000,30000,30000,30000,30000,30000,30000,30000,30000,30000
Minnesota,Ramsey,20000,20000,20000,20000,20000,20000,20000,20000,20000,20000,20000,20000,20000,20000,20000,20000,20000,20000
";

const CDC_ADMISSIONS: &str = "\
age,Hospitalized-low,Hospitalized-high,ICU-low,ICU-high
0,0.1,0.2,0.02,0.04
20,0.1,0.2,0.02,0.04
45,0.1,0.2,0.02,0.04
55,0.1,0.2,0.02,0.04
65,0.1,0.2,0.02,0.04
75,0.1,0.2,0.02,0.04
85,0.1,0.2,0.02,0.04
";

const CDC_DEATHS: &str = "\
age,Deaths-low,Deaths-high
0,0.01,0.02
20,0.01,0.02
45,0.01,0.02
55,0.01,0.02
65,0.01,0.02
75,0.01,0.02
85,0.01,0.02
";

const VERITY_ADMISSIONS: &str = "\
age,Hospitalized,ICU
0,0.001,0.0005
10,0.004,0.002
20,0.01,0.005
30,0.03,0.015
40,0.04,0.02
50,0.08,0.04
60,0.12,0.06
70,0.16,0.08
80,0.18,0.09
";

const VERITY_DEATHS: &str = "\
age,Deaths
0,0.00002
10,0.00007
20,0.0003
30,0.0008
40,0.0015
50,0.006
60,0.02
70,0.04
80,0.08
";

fn tables() -> ReferenceTables {
    let cdc = (
        RateTable::from_csv(CDC_ADMISSIONS.as_bytes()).unwrap(),
        RateTable::from_csv(CDC_DEATHS.as_bytes()).unwrap(),
    );
    let verity = (
        RateTable::from_csv(VERITY_ADMISSIONS.as_bytes()).unwrap(),
        RateTable::from_csv(VERITY_DEATHS.as_bytes()).unwrap(),
    );
    ReferenceTables::new()
        .unwrap()
        .with_populations(read_populations(POPULATIONS.as_bytes()).unwrap())
        .unwrap()
        .with_cdc(cdc.0, cdc.1)
        .unwrap()
        .with_verity(verity.0, verity.1)
        .unwrap()
}

fn cases() -> CaseData {
    CaseData::from_csv(CASES.as_bytes(), default_start_date()).unwrap()
}

fn request(county: &str, model: &str) -> ProjectionRequest {
    let mut request = ProjectionRequest::new("Minnesota", county);
    request.clinical_model = model.parse().unwrap();
    request.horizon_days = 120;
    return request;
}

#[test]
fn state_window_drives_county_projection() {
    let data = cases();
    let ramsey = data.region_cases("Minnesota", "Ramsey").unwrap();
    // 2020-03-15 is interpolated, the 2020-03-08 row falls before the start date
    assert_eq!(ramsey.local.confirmed(), vec![40.0, 48.0, 58.0, 70.0, 84.0, 102.0, 120.0]);
    assert_eq!(
        ramsey.parent.confirmed(),
        vec![100.0, 120.0, 145.0, 175.0, 210.0, 252.0, 300.0]
    );

    let p = project_region(&tables(), &data, &request("Ramsey", "default")).unwrap();
    assert_approx_eq!(p.initial_infected(), 240.0);
    assert_approx_eq!(p.population(), 360_000.0);
    assert!(p.beta() > 0.05 && p.beta() < 0.5);
}

#[test]
fn cdc_model_uses_corrected_table_rates() {
    let p = project_region(&tables(), &cases(), &request("Hennepin", "CDC")).unwrap();
    assert_eq!(p.census().len(), 4);
    assert_eq!(p.deaths().len(), 2);

    let incidence = p.trajectory().new_infections();
    let rate = 0.1 * CDC_HOSP_CORRECTION;
    for (x, adm) in incidence.iter().zip(&p.admissions()["Hospitalized-low"]) {
        assert!((rate * x - adm).abs() <= 0.5 + 1e-9);
    }
    for series in p.deaths().values() {
        assert!(series.windows(2).all(|w| w[1] >= w[0]));
    }
}

#[test]
fn verity_model_on_whole_state() {
    let p = project_region(&tables(), &cases(), &request(ALL_SUBREGIONS, "Verity")).unwrap();
    assert_approx_eq!(p.population(), 900_000.0);
    assert_approx_eq!(p.initial_infected(), 600.0);
    assert_eq!(p.admissions().len(), 2);
    let hosp: Real = p.admissions()["Hospitalized"].iter().sum();
    let icu: Real = p.admissions()["ICU"].iter().sum();
    assert!(hosp > icu);
}

#[test]
fn batch_projection_reports_per_request_errors() {
    let requests = vec![
        request("Hennepin", "CDC"),
        request("Anoka", "CDC"),
        request("Ramsey", "Verity"),
    ];
    let results = project_many(&tables(), &cases(), &requests);
    assert!(results[0].is_ok());
    assert!(results[1].as_ref().unwrap_err().is_data());
    let csv = render_csv(results[2].as_ref().unwrap()).unwrap();
    assert_eq!(csv.lines().count(), 121);
}

#[test]
fn unknown_model_name() {
    match "Imperial".parse::<ClinicalModelKind>() {
        Err(Error::ModelSelection(name)) => assert_eq!(name, "Imperial"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn sample_data_set_projects_every_model() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let open = |name: &str| std::fs::File::open(dir.join(name)).unwrap();
    let tables = ReferenceTables::new()
        .unwrap()
        .with_populations(read_populations(open("populations.csv")).unwrap())
        .unwrap()
        .with_cdc(
            RateTable::from_csv(open("cdc_admissions.csv")).unwrap(),
            RateTable::from_csv(open("cdc_deaths.csv")).unwrap(),
        )
        .unwrap()
        .with_verity(
            RateTable::from_csv(open("verity_admissions.csv")).unwrap(),
            RateTable::from_csv(open("verity_deaths.csv")).unwrap(),
        )
        .unwrap();
    let data = CaseData::from_csv(open("cases.csv"), default_start_date()).unwrap();

    let mut requests = vec![];
    for &(state, county) in &[("New York", "New York City"), ("Minnesota", ALL_SUBREGIONS)] {
        for model in &["CDC", "Verity", "default"] {
            let mut request = ProjectionRequest::new(state, county);
            request.clinical_model = model.parse().unwrap();
            requests.push(request);
        }
    }
    for (request, result) in requests.iter().zip(project_many(&tables, &data, &requests)) {
        let p = result.unwrap();
        assert_eq!(p.days(), request.horizon_days);
        assert!(p.beta() > request.gamma);
        assert!(!p.peak_census().is_empty());
    }
}
