use dialoguer::{Input, Select};
use zipshard_core::{
    Assignment, AssignmentSource, Device, FragmentRecord, Result, ShardError, SplitProgress,
};

const MIB: f64 = 1024.0 * 1024.0;

pub fn prompt_err(e: dialoguer::Error) -> ShardError {
    ShardError::Io(std::io::Error::other(e))
}

fn mib(bytes: u64) -> f64 {
    bytes as f64 / MIB
}

/// Blank means "everything left"; otherwise a size in MB.
pub fn parse_megabytes(input: &str) -> std::result::Result<Option<i64>, String> {
    let t = input.trim();
    if t.is_empty() {
        return Ok(None);
    }
    let mb: f64 = t
        .parse()
        .map_err(|_| "Invalid input. Please enter a number or press Enter.".to_string())?;
    if !mb.is_finite() {
        return Err("Invalid input. Please enter a finite number.".to_string());
    }
    let bytes = (mb * MIB) as i64;
    Ok(Some(if mb > 0.0 { bytes.max(1) } else { bytes }))
}

/// Asks the operator which USB device gets the next fragment and how much.
pub struct PromptSource {
    devices: Vec<Device>,
}

impl PromptSource {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }
}

impl AssignmentSource for PromptSource {
    fn next_assignment(&mut self, p: &SplitProgress) -> Result<Option<Assignment>> {
        let labels: Vec<String> = self.devices.iter().map(|d| d.to_string()).collect();
        loop {
            eprintln!(
                "\nPart {:03}: {:.2} MB of {:.2} MB left",
                p.part_index,
                mib(p.remaining),
                mib(p.total)
            );
            let Some(idx) = Select::new()
                .with_prompt("Select USB device (Esc to stop)")
                .items(&labels[..])
                .default(0)
                .interact_opt()
                .map_err(prompt_err)?
            else {
                return Ok(None);
            };
            let device = self.devices[idx].clone();

            let answer = Input::<String>::new()
                .with_prompt(format!(
                    "How many MB to copy to {}? (Remaining: {:.2} MB) or press Enter to use all",
                    device.mount_point.display(),
                    mib(p.remaining)
                ))
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            match parse_megabytes(&answer) {
                Ok(bytes) => return Ok(Some(Assignment { device, bytes })),
                Err(msg) => eprintln!("{msg}"),
            }
        }
    }

    fn rejected(&mut self, _assignment: &Assignment, reason: &str) {
        eprintln!("Rejected: {reason}. Try again.");
    }

    fn copy_failed(&mut self, _assignment: &Assignment, error: &ShardError) {
        eprintln!("Error: {error}\nCopy failed. Try a different device or size.");
    }

    fn copied(&mut self, record: &FragmentRecord, bytes: u64) {
        eprintln!("Copied {:.2} MB: {}", mib(bytes), record.path.display());
    }
}
