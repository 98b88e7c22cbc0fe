use std::io::{self, BufRead, Write};

use crate::context::UserValuesConstraint;
use crate::definition::NamedScenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuChoice {
    /// Index into the scenario list.
    Scenario(usize),
    Exit,
    Invalid,
}

/// Options are numbered from 1 in the order the scenarios were defined, 0 exits.
pub(crate) fn parse_choice(line: &str, scenario_count: usize) -> MenuChoice {
    match line.trim().parse::<usize>() {
        Ok(0) => MenuChoice::Exit,
        Ok(n) if n <= scenario_count => MenuChoice::Scenario(n - 1),
        _ => MenuChoice::Invalid,
    }
}

fn print_menu<RV: UserValuesConstraint>(
    output: &mut impl Write,
    title: &str,
    scenarios: &[NamedScenario<RV>],
) -> io::Result<()> {
    writeln!(output, "\n{}", "=".repeat(60))?;
    writeln!(output, " {title}")?;
    writeln!(output, "{}", "=".repeat(60))?;
    for (i, scenario) in scenarios.iter().enumerate() {
        writeln!(output, "{}. {}", i + 1, scenario.description)?;
    }
    writeln!(output, "0. Exit")?;
    write!(output, "\nChoose an option: ")?;
    output.flush()
}

/// Show the menu and call `on_select` with the chosen scenario index until the user exits or the
/// input ends.
pub(crate) fn run_menu<RV: UserValuesConstraint>(
    mut input: impl BufRead,
    mut output: impl Write,
    title: &str,
    scenarios: &[NamedScenario<RV>],
    mut on_select: impl FnMut(usize),
) -> io::Result<()> {
    loop {
        print_menu(&mut output, title, scenarios)?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(());
        }

        match parse_choice(&line, scenarios.len()) {
            MenuChoice::Scenario(index) => on_select(index),
            MenuChoice::Exit => {
                writeln!(output, "Goodbye!")?;
                return Ok(());
            }
            MenuChoice::Invalid => writeln!(output, "Unknown option '{}'", line.trim())?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScenarioContext;
    use crate::types::TunnelResult;
    use pretty_assertions::assert_eq;
    use ticket_tunnel_instruments::Verdict;

    #[derive(Debug, Default)]
    struct Values;

    impl UserValuesConstraint for Values {}

    fn noop(_ctx: &mut ScenarioContext<Values>) -> TunnelResult<Verdict> {
        Ok(Verdict::Measured)
    }

    fn scenarios() -> Vec<NamedScenario<Values>> {
        ["integrity", "load"]
            .into_iter()
            .map(|name| NamedScenario {
                name: name.to_string(),
                description: format!("Run {name}"),
                hook: noop,
            })
            .collect()
    }

    #[test]
    fn parse_menu_input() {
        assert_eq!(MenuChoice::Exit, parse_choice("0\n", 4));
        assert_eq!(MenuChoice::Scenario(0), parse_choice(" 1 ", 4));
        assert_eq!(MenuChoice::Scenario(3), parse_choice("4", 4));
        assert_eq!(MenuChoice::Invalid, parse_choice("5", 4));
        assert_eq!(MenuChoice::Invalid, parse_choice("load", 4));
        assert_eq!(MenuChoice::Invalid, parse_choice("", 4));
    }

    #[test]
    fn menu_runs_selected_scenarios_until_exit() {
        let input = "2\nnope\n1\n0\n2\n".as_bytes();
        let mut output = Vec::new();
        let mut selected = Vec::new();

        run_menu(input, &mut output, "Test", &scenarios(), |i| selected.push(i)).unwrap();

        assert_eq!(vec![1, 0], selected);
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("1. Run integrity"));
        assert!(output.contains("Unknown option 'nope'"));
        assert!(output.contains("Goodbye!"));
    }

    #[test]
    fn menu_stops_at_end_of_input() {
        let mut selected = Vec::new();

        run_menu("1\n".as_bytes(), io::sink(), "Test", &scenarios(), |i| {
            selected.push(i)
        })
        .unwrap();

        assert_eq!(vec![0], selected);
    }
}
