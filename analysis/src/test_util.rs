use crate::database::{util::quote_identifier, ConstraintKey, Instance, Measurement, SolverResults, ID};
use rusqlite::{params, Connection};

pub const COLUMNS: [&str; 18] = [
    "instance_id",
    "smt_path",
    "grid",
    "grid_index",
    "try_val",
    "assert_equals",
    "is_sat",
    "classic",
    "distinct",
    "percol",
    "is_bool",
    "prefill",
    "cvc5_time",
    "cvc5_solve_time",
    "cvc5_memory",
    "z3_time",
    "z3_solve_time",
    "z3_memory",
];

pub fn create_results(connection: &Connection) {
    let columns = COLUMNS
        .iter()
        .map(|column| {
            let kind = if column.contains("time") || column.contains("memory") {
                "real"
            } else {
                "integer"
            };

            format!("{} {kind}", quote_identifier(column))
        })
        .collect::<Vec<_>>()
        .join(", ");

    connection
        .execute(&format!("create table results ({columns})"), [])
        .unwrap();
}

pub fn insert(connection: &Connection, instance: ID, flags: [bool; 5], cvc5: f64, z3: f64) {
    connection
        .execute(
            "insert into results values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                instance,
                format!("smt/{instance}.smt2"),
                "3x3",
                "0, 1, 2",
                7,
                "x = 7",
                1,
                flags[0],
                flags[1],
                flags[2],
                flags[3],
                flags[4],
                cvc5,
                cvc5 * 2.0,
                128.0,
                z3,
                z3 * 2.0,
                64.0
            ],
        )
        .unwrap();
}

/// in-memory result table holding `rows` as (instance, flags, cvc5 time, z3 time)
pub fn database(rows: &[(ID, [bool; 5], f64, f64)]) -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    create_results(&connection);

    for (instance, flags, cvc5, z3) in rows {
        insert(&connection, *instance, *flags, *cvc5, *z3);
    }

    connection
}

pub fn key(flags: &[bool]) -> ConstraintKey {
    ConstraintKey::from_flags(flags)
}

/// instance with results given as (flags, [(solver, primary time)])
pub fn instance(id: ID, results: &[(&[bool], &[(&str, f64)])]) -> Instance {
    let mut instance = Instance::empty(id);

    for (flags, solvers) in results {
        let results: SolverResults = solvers
            .iter()
            .map(|(name, time)| ((*name).to_owned(), Measurement::new(*time, 0.0, 0.0)))
            .collect();
        instance.results.insert(key(flags), results);
    }

    instance
}

pub const T: bool = true;
pub const F: bool = false;
