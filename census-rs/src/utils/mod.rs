mod ascii_plot;
mod functions;
mod ma;

pub use ascii_plot::*;
pub use functions::*;
pub use ma::*;
