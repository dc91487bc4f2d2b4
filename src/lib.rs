pub mod cli;
pub mod error;
pub mod fetcher;
pub mod model;

pub mod io {
    pub mod ensembl;
    pub mod fasta;
    pub mod runfiles;
    pub mod table;
}

pub mod genome {
    pub mod config;
    pub mod driver;
    pub mod layout;
    pub mod stages;
    pub mod status;
}

pub mod util {
    pub mod logging;
    pub mod tools;
}

pub mod subcommands {
    pub mod flank;
    pub mod genome;
    pub mod syscheck;
}
