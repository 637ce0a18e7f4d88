//! Line-driven dashboard session.
//!
//! Starts on the overview. `entry` walks through the form field by field,
//! `cancel` leaves the form, `filter` sets the overview date and `generate`
//! sends the prompt box.

use std::io::{BufRead, Write};

use opd_dashboard_core::models::{parse_date, EntryForm, FollowUp, Gender, Prakriti};
use opd_dashboard_core::session::{Session, View, DISCLAIMER};
use opd_dashboard_core::store::RecordStore;
use opd_dashboard_core::DashboardError;
use opd_dashboard_llm::{generate_response, GenerateOutcome, InferenceClient};

use crate::render::{format_page, OutputFormat};

const HELP: &str = "\
Commands:
  overview              Show the OPD overview
  entry                 Add an OPD entry
  cancel                Leave the entry form
  filter [YYYY-MM-DD]   Filter the overview by date (no date clears it)
  generate <prompt>     Ask for an AI summary of all OPD data
  help                  Show this help
  quit                  Exit
";

struct Interactive<'a, R, W> {
    store: &'a dyn RecordStore,
    client: &'a dyn InferenceClient,
    input: R,
    output: &'a mut W,
    session: Session,
}

/// Run until `quit` or end of input.
pub fn run_session<R: BufRead, W: Write>(
    store: &dyn RecordStore,
    client: &dyn InferenceClient,
    input: R,
    output: &mut W,
) -> anyhow::Result<()> {
    let mut shell = Interactive {
        store,
        client,
        input,
        output,
        session: Session::new(),
    };
    shell.run()
}

impl<R: BufRead, W: Write> Interactive<'_, R, W> {
    fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "OPD Summary Dashboard. Type 'help' for commands.")?;
        writeln!(self.output, "{}", DISCLAIMER)?;
        self.render_overview()?;

        loop {
            let prompt = match self.session.view() {
                View::Overview => "[overview]> ",
                View::Entry => "[entry]> ",
            };
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                break;
            };
            let line = line.trim();
            let (command, argument) = match line.split_once(char::is_whitespace) {
                Some((command, rest)) => (command, rest.trim()),
                None => (line, ""),
            };

            match command {
                "" => {}
                "overview" => {
                    self.session.show_overview();
                    self.render_overview()?;
                }
                "entry" => self.entry()?,
                "cancel" => {
                    self.session.cancel_entry();
                    self.render_overview()?;
                }
                "filter" => self.filter(argument)?,
                "generate" => self.generate(argument)?,
                "help" => write!(self.output, "{}", HELP)?,
                "quit" | "exit" => break,
                other => writeln!(
                    self.output,
                    "Unknown command '{}'. Type 'help' for commands.",
                    other
                )?,
            }
        }
        Ok(())
    }

    /// One input line without its terminator. `None` at end of input.
    fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Ask for one field. A blank answer keeps the default.
    fn ask(&mut self, label: &str, default: &str) -> anyhow::Result<Option<String>> {
        if default.is_empty() {
            write!(self.output, "{}: ", label)?;
        } else {
            write!(self.output, "{} [{}]: ", label, default)?;
        }
        self.output.flush()?;

        Ok(self.read_line()?.map(|answer| {
            if answer.trim().is_empty() {
                default.to_string()
            } else {
                answer
            }
        }))
    }

    fn render_overview(&mut self) -> anyhow::Result<()> {
        match self.session.render_overview(self.store) {
            Ok(page) => {
                let text = format_page(&page, self.session.date_filter(), OutputFormat::Table)?;
                write!(self.output, "{}", text)?;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot load OPD records");
                writeln!(self.output, "Error: {}", e)?;
            }
        }
        Ok(())
    }

    fn entry(&mut self) -> anyhow::Result<()> {
        self.session.show_entry();
        writeln!(self.output, "Add OPD Patient Details (blank keeps the value in brackets)")?;

        let mut form = EntryForm::today();
        let gender_label = format!("Gender ({})", options(&Gender::ALL.map(|g| g.as_str())));
        let prakriti_label = format!("Prakriti ({})", options(&Prakriti::ALL.map(|p| p.as_str())));
        let follow_up_label = format!(
            "Follow-up Required? ({})",
            options(&FollowUp::ALL.map(|f| f.as_str()))
        );

        let fields: [(&str, &mut String); 8] = [
            ("OPD Date", &mut form.date),
            ("Patient Name", &mut form.patient_name),
            ("Age", &mut form.age),
            (&gender_label, &mut form.gender),
            (&prakriti_label, &mut form.prakriti),
            ("Main Complaint", &mut form.complaint),
            ("Diagnosis (Doctor Entry)", &mut form.diagnosis),
            (&follow_up_label, &mut form.follow_up),
        ];
        for (label, field) in fields {
            match self.ask(label, field)? {
                Some(value) => *field = value,
                None => return Ok(()),
            }
        }

        let choice = self.ask("Save entry or cancel? (save/cancel)", "save")?;
        if choice.as_deref().map(str::trim) == Some("cancel") {
            self.session.cancel_entry();
            writeln!(self.output, "Entry cancelled.")?;
            return self.render_overview();
        }
        if choice.is_none() {
            return Ok(());
        }

        match self.session.submit_entry(self.store, &form) {
            Ok(_) => {
                writeln!(self.output, "OPD entry added successfully")?;
                self.render_overview()
            }
            Err(DashboardError::Validation(e)) => {
                writeln!(self.output, "Invalid entry: {}", e)?;
                writeln!(self.output, "Type 'entry' to try again or 'cancel' to go back.")?;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot save OPD entry");
                writeln!(self.output, "Error: {}", e)?;
                Ok(())
            }
        }
    }

    fn filter(&mut self, argument: &str) -> anyhow::Result<()> {
        if argument.is_empty() || argument == "clear" {
            self.session.set_date_filter(None);
        } else {
            match parse_date(argument) {
                Ok(date) => self.session.set_date_filter(Some(date)),
                Err(e) => {
                    writeln!(self.output, "{}", e)?;
                    return Ok(());
                }
            }
        }
        self.session.show_overview();
        self.render_overview()
    }

    fn generate(&mut self, instruction: &str) -> anyhow::Result<()> {
        let records = match self.store.fetch_all() {
            Ok(records) => records,
            Err(e) => {
                writeln!(self.output, "Error: {}", e)?;
                return Ok(());
            }
        };

        match generate_response(self.client, &records, instruction) {
            Ok(GenerateOutcome::Warning(warning)) => writeln!(self.output, "Warning: {}", warning)?,
            Ok(GenerateOutcome::Response(text)) => {
                writeln!(self.output, "AI Response:\n{}", text)?
            }
            Err(e) => {
                tracing::error!(error = %e, "AI summary failed");
                writeln!(self.output, "Error: {}", e)?;
            }
        }
        Ok(())
    }
}

fn options(values: &[&str]) -> String {
    values.join("/")
}
