use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

const NAMES: [&str; 6] = ["Alice", "Bob", "Carol", "Dave", "Erin", "Frank"];
const SITES: [&str; 3] = ["North", "Harbour", "Depot"];

/// Minimal deterministic PRNG (xorshift64*)
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng {
            state: seed.wrapping_mul(6364136223846793005).wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545F4914F6CDD1D)
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Hours worked, rounded to a quarter hour.
    fn hours(&mut self) -> f64 {
        (self.next_u64() % 48 + 1) as f64 * 0.25
    }
}

struct JobRow {
    job_id: i64,
    name: String,
    site: String,
    hours: f64,
}

fn generate_rows(ids: impl Iterator<Item = i64>, rng: &mut SimpleRng) -> Vec<JobRow> {
    ids.map(|job_id| JobRow {
        job_id,
        name: rng.pick(&NAMES).to_string(),
        site: rng.pick(&SITES).to_string(),
        hours: rng.hours(),
    })
    .collect()
}

fn write_csv(path: &Path, rows: &[JobRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(["job_id", "name", "site", "hours"])?;
    for row in rows {
        writer.write_record([
            row.job_id.to_string(),
            row.name.clone(),
            row.site.clone(),
            row.hours.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Job ids are written as numbers, the way most spreadsheets hold them.
fn write_xlsx(path: &Path, rows: &[JobRow]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in ["job_id", "name", "site", "hours"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_number(r, 0, row.job_id as f64)?;
        sheet.write_string(r, 1, &row.name)?;
        sheet.write_string(r, 2, &row.site)?;
        sheet.write_number(r, 3, row.hours)?;
    }
    workbook.save(path).context("saving workbook")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let out_dir = Path::new("samples");
    std::fs::create_dir_all(out_dir).context("creating samples directory")?;

    let csv_rows = generate_rows(30..=50, &mut rng);
    let xlsx_rows = generate_rows((1..=12).chain([42]), &mut rng);

    write_csv(&out_dir.join("jobs1.csv"), &csv_rows)?;
    write_xlsx(&out_dir.join("jobs2.xlsx"), &xlsx_rows)?;
    std::fs::write(out_dir.join("notes.txt"), "job_id\n42\n").context("writing notes.txt")?;

    println!(
        "Wrote {} CSV rows and {} spreadsheet rows to {}/ (job_id 42 appears in both)",
        csv_rows.len(),
        xlsx_rows.len(),
        out_dir.display()
    );
    Ok(())
}
