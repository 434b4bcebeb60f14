use crate::{
    error::{Error, Result},
    prelude::Real,
    utils::gradient,
};
use getset::{CopyGetters, Getters};
use log::warn;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// Stocks of the SIR model at a single instant. S + I + R is the total
/// population, conserved by both stepping schemes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EpiState {
    pub susceptible: Real,
    pub infected: Real,
    pub removed: Real,
}

impl EpiState {
    pub fn new(susceptible: Real, infected: Real, removed: Real) -> Self {
        EpiState {
            susceptible,
            infected,
            removed,
        }
    }

    pub fn total(&self) -> Real {
        self.susceptible + self.infected + self.removed
    }

    pub fn is_finite(&self) -> bool {
        self.susceptible.is_finite() && self.infected.is_finite() && self.removed.is_finite()
    }

    /// Time derivative (dS/dt, dI/dt, dR/dt) of the continuous model.
    pub fn derivative(&self, params: &SirParams) -> EpiState {
        let infections = params.beta * self.susceptible * self.infected / params.population;
        let removals = params.gamma * self.infected;
        EpiState {
            susceptible: -infections,
            infected: infections - removals,
            removed: removals,
        }
    }
}

impl Add for EpiState {
    type Output = EpiState;

    fn add(self, rhs: EpiState) -> EpiState {
        EpiState {
            susceptible: self.susceptible + rhs.susceptible,
            infected: self.infected + rhs.infected,
            removed: self.removed + rhs.removed,
        }
    }
}

impl Mul<EpiState> for Real {
    type Output = EpiState;

    fn mul(self, rhs: EpiState) -> EpiState {
        EpiState {
            susceptible: self * rhs.susceptible,
            infected: self * rhs.infected,
            removed: self * rhs.removed,
        }
    }
}

/// Parameters of a SIR run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct SirParams {
    /// Effective transmission rate.
    beta: Real,
    /// Removal rate, inverse of the mean infectious period.
    gamma: Real,
    /// Total population N.
    population: Real,
    /// Initial number of infected I0.
    initial_infected: Real,
}

impl SirParams {
    /// Validate and create parameters. Rates must be non-negative, N
    /// positive and 0 <= I0 <= N.
    pub fn new(beta: Real, gamma: Real, population: Real, initial_infected: Real) -> Result<Self> {
        for (name, value) in &[
            ("beta", beta),
            ("gamma", gamma),
            ("population", population),
            ("initial infected", initial_infected),
        ] {
            if !value.is_finite() {
                return Err(Error::invalid(format!("{} must be finite, got {}", name, value)));
            }
        }
        if beta < 0.0 || gamma < 0.0 {
            return Err(Error::invalid(format!(
                "rates must be non-negative: beta={}, gamma={}",
                beta, gamma
            )));
        }
        if population <= 0.0 {
            return Err(Error::invalid(format!("population must be positive, got {}", population)));
        }
        if initial_infected < 0.0 || initial_infected > population {
            return Err(Error::invalid(format!(
                "initial infected {} outside [0, {}]",
                initial_infected, population
            )));
        }
        Ok(SirParams {
            beta,
            gamma,
            population,
            initial_infected,
        })
    }

    /// S0 = N - I0, I0, R0 = 0
    pub fn initial_state(&self) -> EpiState {
        EpiState::new(
            self.population - self.initial_infected,
            self.initial_infected,
            0.0,
        )
    }

    /// Basic reproduction number β/γ.
    pub fn r0(&self) -> Real {
        self.beta / self.gamma
    }
}

/// A single day of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub susceptible: Real,
    pub infected: Real,
    pub removed: Real,
    pub new_infections: Real,
}

/// Output of a simulation: one entry per simulated time point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters)]
#[getset(get = "pub")]
pub struct Trajectory {
    susceptible: Vec<Real>,
    infected: Vec<Real>,
    removed: Vec<Real>,
    new_infections: Vec<Real>,
}

impl Trajectory {
    fn with_capacity(n: usize) -> Self {
        Trajectory {
            susceptible: Vec::with_capacity(n),
            infected: Vec::with_capacity(n),
            removed: Vec::with_capacity(n),
            new_infections: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, state: &EpiState) {
        self.susceptible.push(state.susceptible);
        self.infected.push(state.infected);
        self.removed.push(state.removed);
    }

    pub fn len(&self) -> usize {
        self.susceptible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.susceptible.is_empty()
    }

    /// Return the t-th point.
    pub fn point(&self, t: usize) -> Option<TrajectoryPoint> {
        Some(TrajectoryPoint {
            susceptible: *self.susceptible.get(t)?,
            infected: *self.infected.get(t)?,
            removed: *self.removed.get(t)?,
            new_infections: *self.new_infections.get(t)?,
        })
    }

    pub fn points(&self) -> impl Iterator<Item = TrajectoryPoint> + '_ {
        (0..self.len()).filter_map(move |t| self.point(t))
    }

    /// Time index and value of the maximum number of infected.
    pub fn peak_infected(&self) -> Option<(usize, Real)> {
        self.infected
            .iter()
            .cloned()
            .enumerate()
            .fold(None, |acc, (t, x)| match acc {
                Some((_, m)) if m >= x => acc,
                _ => Some((t, x)),
            })
    }
}

/// Time grid 0, 1, ..., n - 1 in days.
pub fn daily_grid(n: usize) -> Vec<Real> {
    (0..n).map(|t| t as Real).collect()
}

/// Integrate the continuous SIR system over the given time points.
///
/// Each interval between consecutive points is integrated with `substeps`
/// classic Runge-Kutta steps. The first point holds the initial condition.
/// New infections are the negative numerical gradient of S.
pub fn continuous_sir(params: &SirParams, timepts: &[Real], substeps: usize) -> Result<Trajectory> {
    if timepts.is_empty() {
        return Err(Error::invalid("empty time grid"));
    }
    if substeps == 0 {
        return Err(Error::invalid("at least one integration step per interval is required"));
    }
    if timepts.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(Error::invalid("time grid must be strictly increasing"));
    }

    let mut out = Trajectory::with_capacity(timepts.len());
    let mut state = params.initial_state();
    out.push(&state);

    for (k, w) in timepts.windows(2).enumerate() {
        let h = (w[1] - w[0]) / substeps as Real;
        for _ in 0..substeps {
            state = rk4_step(&state, params, h);
        }
        if !state.is_finite() {
            return Err(Error::numeric(
                "continuous SIR",
                format!("non-finite state {:?} at t={} for {:?}", state, timepts[k + 1], params),
            ));
        }
        out.push(&state);
    }

    out.new_infections = if out.len() < 2 {
        vec![0.0; out.len()]
    } else {
        gradient(&out.susceptible).into_iter().map(|x| -x).collect()
    };
    Ok(out)
}

fn rk4_step(y: &EpiState, params: &SirParams, h: Real) -> EpiState {
    let k1 = y.derivative(params);
    let k2 = (*y + (h / 2.0) * k1).derivative(params);
    let k3 = (*y + (h / 2.0) * k2).derivative(params);
    let k4 = (*y + h * k3).derivative(params);
    *y + (h / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4)
}

/// Discrete SIR recursion with one step per day.
///
/// new[t] = β/N S[t-1] I[t-1], S[t] = S[t-1] - new[t],
/// I[t] = I[t-1] + new[t] - γ I[t-1], R[t] = R[t-1] + γ I[t-1].
///
/// The first entry of new infections is the incidence rate β/N S0 I0 at the
/// initial state, so the seed itself is never booked as new cases, in line
/// with the one-sided gradient of the continuous model. The recursion is only
/// meaningful while β I/N < 1 in each step; larger values drive S or I
/// negative. Such excursions are reported in the log but are not clamped.
pub fn discrete_sir(params: &SirParams, steps: usize) -> Result<Trajectory> {
    discrete_sir_refined(params, steps, 1)
}

/// Discrete recursion with `substeps` Euler steps of size 1/substeps per day.
/// New infections are summed over each day. Converges to the continuous model
/// as the number of substeps grows.
pub fn discrete_sir_refined(params: &SirParams, steps: usize, substeps: usize) -> Result<Trajectory> {
    if steps == 0 {
        return Err(Error::invalid("at least one time step is required"));
    }
    if substeps == 0 {
        return Err(Error::invalid("at least one substep per day is required"));
    }
    let dt = 1.0 / substeps as Real;
    let (beta, gamma, n) = (params.beta, params.gamma, params.population);

    let mut out = Trajectory::with_capacity(steps);
    let mut state = params.initial_state();
    let mut unstable = false;
    out.push(&state);
    out.new_infections
        .push(beta / n * state.susceptible * state.infected);

    for t in 1..steps {
        let mut new_infections = 0.0;
        for _ in 0..substeps {
            let EpiState {
                susceptible: s,
                infected: i,
                removed: r,
            } = state;
            if !unstable && dt * beta * i / n >= 1.0 {
                warn!(
                    target: "sir",
                    "discrete SIR step is unstable at t={}: dt*beta*I/N = {}",
                    t,
                    dt * beta * i / n
                );
                unstable = true;
            }
            let infections = dt * beta / n * s * i;
            let removals = dt * gamma * i;
            state = EpiState::new(s - infections, i + infections - removals, r + removals);
            new_infections += infections;
        }
        if !unstable && (state.susceptible < 0.0 || state.infected < 0.0) {
            warn!(target: "sir", "discrete SIR reached negative stocks at t={}: {:?}", t, state);
            unstable = true;
        }
        out.push(&state);
        out.new_infections.push(new_infections);
    }
    Ok(out)
}
