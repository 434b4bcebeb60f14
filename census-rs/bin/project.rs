use std::{fs, path::PathBuf};

use census::{
    clinical::RateTable,
    growth::rank_by_growth,
    prelude::*,
    report::{render_csv, render_plot},
    series::default_start_date,
    tables::read_populations,
};
use chrono::NaiveDate;
use log::{error, info, LevelFilter};
use serde::{Deserialize, Serialize};
use simple_logger::SimpleLogger;

/// Paths of a pair of admission/death rate tables.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RateTablePaths {
    admissions: PathBuf,
    deaths: PathBuf,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct RunConfig {
    cases: PathBuf,
    populations: PathBuf,
    start_date: NaiveDate,
    output_dir: PathBuf,
    verbose: bool,
    plot: bool,
    plot_height: usize,
    rank: usize,
    cdc: Option<RateTablePaths>,
    verity: Option<RateTablePaths>,
    requests: Vec<ProjectionRequest>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            cases: "cases.csv".into(),
            populations: "populations.csv".into(),
            start_date: default_start_date(),
            output_dir: ".".into(),
            verbose: false,
            plot: true,
            plot_height: 12,
            rank: 0,
            cdc: None,
            verity: None,
            requests: vec![],
        }
    }
}

fn read_rate_tables(paths: &RateTablePaths) -> Result<(RateTable, RateTable)> {
    let admissions = RateTable::from_csv(fs::File::open(&paths.admissions)?)?;
    let deaths = RateTable::from_csv(fs::File::open(&paths.deaths)?)?;
    Ok((admissions, deaths))
}

fn load_tables(cfg: &RunConfig) -> Result<ReferenceTables> {
    let populations = read_populations(fs::File::open(&cfg.populations)?)?;
    let mut tables = ReferenceTables::new()?.with_populations(populations)?;
    if let Some(paths) = &cfg.cdc {
        let (admissions, deaths) = read_rate_tables(paths)?;
        tables = tables.with_cdc(admissions, deaths)?;
    }
    if let Some(paths) = &cfg.verity {
        let (admissions, deaths) = read_rate_tables(paths)?;
        tables = tables.with_verity(admissions, deaths)?;
    }
    Ok(tables)
}

fn output_name(request: &ProjectionRequest) -> String {
    let name = format!("{}-{}.csv", request.state, request.county);
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn main() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "conf.toml".to_string());
    let cfg_data = fs::read_to_string(&path)?;
    let cfg: RunConfig = toml::from_str(&cfg_data)?;

    let level = if cfg.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(level)
        .init()
        .map_err(|e| Error::invalid(e.to_string()))?;
    if cfg.verbose {
        println!("{:#?}", cfg);
    }

    let tables = load_tables(&cfg)?;
    let data = CaseData::from_csv(fs::File::open(&cfg.cases)?, cfg.start_date)?;

    if cfg.rank > 0 {
        let states: Vec<(String, CaseSeries)> = data
            .regions()
            .iter()
            .map(|(state, counties)| (state.clone(), CaseSeries::aggregate(counties.values())))
            .collect();
        let ranks = rank_by_growth(states.iter().map(|(s, series)| (s.as_str(), series)));
        for r in ranks.iter().take(cfg.rank) {
            println!("{:<24} heat={:.4} cases={}", r.region, r.heat, r.cases);
        }
    }

    let results = project_many(&tables, &data, &cfg.requests);
    let mut failed = 0;
    for (request, result) in cfg.requests.iter().zip(results) {
        let projection = match result {
            Ok(p) => p,
            Err(e) => {
                error!("{}/{}: {}", request.state, request.county, e);
                failed += 1;
                continue;
            }
        };
        let out = cfg.output_dir.join(output_name(request));
        fs::write(&out, render_csv(&projection)?)?;
        info!("wrote {}", out.display());

        if cfg.plot {
            println!(
                "{}/{} ({} model), beta={:.3}, Td={:.1} days",
                request.state,
                request.county,
                request.clinical_model,
                projection.beta(),
                projection.doubling_time()
            );
            println!("{}", render_plot(&projection, cfg.plot_height));
        }
    }

    if failed > 0 {
        return Err(Error::data(
            "run",
            format!("{} of {} projections failed", failed, cfg.requests.len()),
        ));
    }
    Ok(())
}
