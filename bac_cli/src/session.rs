//! Interactive drinking session over a `BacEngine`.
//!
//! Each input line is one command. Output goes to any `Write`, so the
//! session can be driven from stdin or from tests.

use bac_core::input::{drink_amount, parse_sex, parse_weight};
use bac_core::{BacEngine, Clock, Error, Result};
use std::io::Write;
use std::str::FromStr;

pub const DISCLAIMER: &str = "Warning: this estimate is not necessarily accurate and must not be \
relied on for your own safety. It uses a simplified Widmark-style formula.";

const USAGE: &str = "\
Commands:
  drink <ml> <abv%>   log a drink, e.g. 'drink 330 4,7'
  status              show current BAC and time until sober
  sweet <abv%>        volume at this strength that brings BAC to 0.10%
  weight <kg>         set body weight
  sex <male|female>   set sex
  reset               clear all alcohol (keeps weight and sex)
  info                show the disclaimer
  help                show this list
  quit                end the session";

/// One parsed line of session input
#[derive(Clone, Debug, PartialEq)]
pub enum SessionCommand {
    Drink { volume_ml: f64, abv_percent: f64 },
    Status,
    SweetSpot { abv_percent: f64 },
    Weight(String),
    Sex(String),
    Reset,
    Info,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts
            .next()
            .ok_or_else(|| Error::Input("empty command".into()))?
            .to_lowercase();
        let arg = parts.next().unwrap_or("");

        let command = match verb.as_str() {
            "drink" | "d" => {
                let strength = parts.next().unwrap_or("");
                SessionCommand::Drink {
                    volume_ml: drink_amount(arg),
                    abv_percent: drink_amount(strength),
                }
            }
            "status" | "s" => SessionCommand::Status,
            "sweet" => SessionCommand::SweetSpot {
                abv_percent: drink_amount(arg),
            },
            "weight" | "w" => SessionCommand::Weight(arg.to_string()),
            "sex" => SessionCommand::Sex(arg.to_string()),
            "reset" => SessionCommand::Reset,
            "info" => SessionCommand::Info,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            other => return Err(Error::Input(format!("unknown command '{}'", other))),
        };
        Ok(command)
    }
}

/// Whether the session should keep reading input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

pub struct Session<C: Clock> {
    engine: BacEngine<C>,
    json: bool,
}

impl<C: Clock> Session<C> {
    pub fn new(engine: BacEngine<C>, json: bool) -> Self {
        Self { engine, json }
    }

    pub fn engine(&self) -> &BacEngine<C> {
        &self.engine
    }

    /// Parse and run one input line
    ///
    /// Blank lines are ignored; unknown commands are reported, not fatal.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }

        match line.parse::<SessionCommand>() {
            Ok(command) => self.execute(command, out),
            Err(e) => {
                writeln!(out, "{}. Type 'help' for commands.", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute(&mut self, command: SessionCommand, out: &mut impl Write) -> Result<Flow> {
        match command {
            SessionCommand::Drink {
                volume_ml,
                abv_percent,
            } => {
                self.engine.record_drink(volume_ml, abv_percent);
                writeln!(out, "✓ Logged {} ml at {}%", volume_ml, abv_percent)?;
                self.write_status(out)?;
                self.write_sweet_spot(abv_percent, out)?;
            }

            SessionCommand::Status => {
                // Realize the decay since the last action so the display falls between drinks
                self.engine.tick();
                self.write_status(out)?;
            }

            SessionCommand::SweetSpot { abv_percent } => {
                self.engine.tick();
                self.write_sweet_spot(abv_percent, out)?;
            }

            SessionCommand::Weight(text) => {
                let bounds = self.engine.weight_bounds();
                match parse_weight(&text, &bounds) {
                    Some(weight) => {
                        let settings = self.engine.update_settings(Some(weight), None);
                        writeln!(out, "Weight: {} kg", settings.weight_kg)?;
                    }
                    None => {
                        writeln!(
                            out,
                            "Weight '{}' rejected (allowed {}-{} kg), keeping {} kg",
                            text,
                            bounds.min_kg,
                            bounds.max_kg,
                            self.engine.settings().weight_kg
                        )?;
                    }
                }
            }

            SessionCommand::Sex(text) => match parse_sex(&text) {
                Some(sex) => {
                    let settings = self.engine.update_settings(None, Some(sex));
                    writeln!(out, "Sex: {}", settings.sex)?;
                }
                None => {
                    writeln!(
                        out,
                        "Sex '{}' not recognized (use male or female), keeping {}",
                        text,
                        self.engine.settings().sex
                    )?;
                }
            },

            SessionCommand::Reset => {
                self.engine.reset();
                writeln!(out, "✓ Reset")?;
                self.write_status(out)?;
            }

            SessionCommand::Info => {
                writeln!(out, "{}", DISCLAIMER)?;
                writeln!(
                    out,
                    "Log each drink's volume and strength as you have it; metabolism is \
                     taken into account between entries."
                )?;
            }

            SessionCommand::Help => writeln!(out, "{}", USAGE)?,

            SessionCommand::Quit => return Ok(Flow::Stop),
        }

        Ok(Flow::Continue)
    }

    pub fn write_status(&self, out: &mut impl Write) -> Result<()> {
        if self.json {
            let line = serde_json::to_string(&self.engine.snapshot())?;
            writeln!(out, "{}", line)?;
            return Ok(());
        }

        let sober = self.engine.time_until_sober();
        let sober_text = if sober.is_sober() {
            sober.to_string()
        } else {
            format!("sober in {}", sober)
        };
        writeln!(
            out,
            "BAC: {:.2}‰ ({:.3}%) | {}",
            self.engine.current_promille(),
            self.engine.current_bac(),
            sober_text
        )?;
        Ok(())
    }

    fn write_sweet_spot(&self, abv_percent: f64, out: &mut impl Write) -> Result<()> {
        if abv_percent <= 0.0 {
            return Ok(());
        }

        match self.engine.sweet_spot_volume_ml(abv_percent) {
            Some(volume) => writeln!(out, "Sweet spot: {:.0}ml", volume)?,
            None => writeln!(out, "No sweet spot at {}%", abv_percent)?,
        }
        Ok(())
    }
}
