//! The `hmc` command.
//!
//! Provides a handful of hard-coded example expressions (there is no
//! lexer/parser in scope) and runs them through one or both inference
//! strategies, printing the resulting scheme or diagnostic.
//!
//! Options:
//! - `--strategy` - which driver to run: `w`, `j`, or both (default)
//! - `--scenario` - which built-in expression to check (default: all)

use std::process;

use clap::{Parser, ValueEnum};
use hm_typeck::expr::{self, Expr};
use hm_typeck::ty::{Scheme, Ty};
use hm_typeck::{env::Env, infer_j, infer_w, Diagnostic};

#[derive(Parser)]
#[command(name = "hmc", version, about = "Hindley-Milner inference scenario runner")]
struct Cli {
    /// Which inference strategy to run (default: both, compared side by side)
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Which built-in scenario to check (default: all)
    #[arg(long)]
    scenario: Option<String>,
}

#[derive(Copy, Clone, ValueEnum)]
enum StrategyArg {
    W,
    J,
}

fn main() {
    let cli = Cli::parse();

    let scenarios = scenarios();
    let selected: Vec<&Scenario> = match &cli.scenario {
        Some(name) => {
            let found: Vec<&Scenario> = scenarios.iter().filter(|s| s.name == name).collect();
            if found.is_empty() {
                eprintln!(
                    "error: no such scenario '{name}' (available: {})",
                    scenarios.iter().map(|s| s.name).collect::<Vec<_>>().join(", ")
                );
                process::exit(1);
            }
            found
        }
        None => scenarios.iter().collect(),
    };

    let mut any_failed = false;
    for scenario in selected {
        println!("== {} ==", scenario.name);
        println!("  {}", (scenario.build)());

        if cli.strategy.is_none() || matches!(cli.strategy, Some(StrategyArg::W)) {
            run_one("w", scenario, &mut any_failed);
        }
        if cli.strategy.is_none() || matches!(cli.strategy, Some(StrategyArg::J)) {
            run_one("j", scenario, &mut any_failed);
        }
    }

    if any_failed {
        process::exit(1);
    }
}

fn run_one(label: &str, scenario: &Scenario, any_failed: &mut bool) {
    let seed = (scenario.seed)();
    let expr = (scenario.build)();
    let result: Result<Scheme, Diagnostic> = match label {
        "w" => infer_w::check_in(&seed, &expr),
        "j" => infer_j::check_in(&seed, &expr),
        _ => unreachable!("only w and j strategies are defined"),
    };
    match result {
        Ok(scheme) => println!("  [{label}] {scheme}"),
        Err(diag) => {
            *any_failed = true;
            println!("  [{label}] error:");
            for line in diag.to_string().lines() {
                println!("    {line}");
            }
        }
    }
}

/// One runnable example: a human-readable name, a seed-environment builder,
/// and the expression to check. Built fresh per strategy run since fresh
/// type variables must not be shared across strategies.
struct Scenario {
    name: &'static str,
    seed: fn() -> Env<'static>,
    build: fn() -> Expr,
}

fn seed_with_condint() -> Env<'static> {
    let mut env = hm_typeck::builtins::seed_env();
    env.insert("condint".into(), Scheme::mono(Ty::fun(Ty::int(), Ty::bool_())));
    env
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "e1-let-polymorphism",
            seed: hm_typeck::builtins::seed_env,
            build: || {
                expr::let_(
                    "id",
                    expr::abs("x", expr::var("x")),
                    expr::app2(expr::var("id"), expr::var("square"), expr::app(expr::var("id"), expr::int(5))),
                )
            },
        },
        Scenario {
            name: "e2-self-application-of-id",
            seed: hm_typeck::builtins::seed_env,
            build: || {
                expr::let_(
                    "id",
                    expr::abs("x", expr::var("x")),
                    expr::app(
                        expr::app(expr::var("id"), expr::var("id")),
                        expr::app(expr::var("id"), expr::var("id")),
                    ),
                )
            },
        },
        Scenario {
            name: "e3-occurs-check",
            seed: hm_typeck::builtins::seed_env,
            build: || {
                expr::let_(
                    "id",
                    expr::abs("x", expr::var("x")),
                    expr::app(expr::abs("f", expr::app(expr::var("f"), expr::var("f"))), expr::var("id")),
                )
            },
        },
        Scenario {
            name: "e4-lambda-monomorphism",
            seed: hm_typeck::builtins::seed_env,
            build: || {
                expr::app(
                    expr::abs(
                        "id",
                        expr::app2(expr::var("id"), expr::var("square"), expr::app(expr::var("id"), expr::int(5))),
                    ),
                    expr::abs("x", expr::var("x")),
                )
            },
        },
        Scenario {
            name: "e5-mutual-recursion-identity",
            seed: hm_typeck::builtins::seed_env,
            build: || {
                expr::let_rec(
                    vec![("f", expr::abs("x", expr::var("x"))), ("g", expr::var("f"))],
                    expr::var("g"),
                )
            },
        },
        Scenario {
            name: "e6-if-branches",
            seed: hm_typeck::builtins::seed_env,
            build: || expr::if_(expr::bool_(true), expr::int(1), expr::int(2)),
        },
        Scenario {
            name: "e7-return-in-branch",
            seed: hm_typeck::builtins::seed_env,
            build: || {
                expr::abs(
                    "x",
                    expr::if_(expr::var("x"), expr::return_some(expr::int(0)), expr::int(42)),
                )
            },
        },
        Scenario {
            name: "s1-mutual-recursion-regression",
            seed: hm_typeck::builtins::seed_env,
            build: || {
                expr::let_rec(
                    vec![("f", expr::abs("x", expr::var("x"))), ("g", expr::var("f"))],
                    expr::var("g"),
                )
            },
        },
        Scenario {
            name: "s2-nested-self-application",
            seed: hm_typeck::builtins::seed_env,
            build: || {
                expr::let_(
                    "id",
                    expr::abs("x", expr::var("x")),
                    expr::app(
                        expr::app(expr::var("id"), expr::var("id")),
                        expr::app(expr::var("id"), expr::var("id")),
                    ),
                )
            },
        },
        Scenario {
            name: "s3-recursive-return-and-condint",
            seed: seed_with_condint,
            build: || {
                expr::let_rec(
                    vec![(
                        "count_down",
                        expr::abs(
                            "n",
                            expr::if_(
                                expr::app(expr::var("condint"), expr::var("n")),
                                expr::return_unit(),
                                expr::stmt(vec![
                                    expr::app(expr::var("print"), expr::str_("tick")),
                                    expr::app(expr::var("count_down"), expr::var("n")),
                                ]),
                            ),
                        ),
                    )],
                    expr::app(expr::var("count_down"), expr::int(3)),
                )
            },
        },
    ]
}
