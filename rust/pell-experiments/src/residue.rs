//! Residue-class cross tabulation: does x0 mod m depend on D mod M?
//!
//! The classic instance is x0 mod 8 against p mod 32 for prime p. Shares
//! below 100% are reported as measured; the table does not try to explain
//! exceptions away.

use serde::Serialize;

use crate::survey::PellRecord;

/// Counts for one residue class of D.
#[derive(Debug, Clone, Serialize)]
pub struct ResidueRow {
    /// D mod d_modulus.
    pub d_residue: u64,
    pub total: usize,
    /// counts[r] = number of D in this class with x0 = r (mod x_modulus).
    pub counts: Vec<usize>,
    /// Most frequent x0 residue (smallest on ties).
    pub dominant: u64,
    /// Fraction of the class taking the dominant residue.
    pub dominant_share: f64,
}

impl ResidueRow {
    /// Every D in the class shares one x0 residue.
    pub fn is_deterministic(&self) -> bool {
        self.total > 0 && self.counts[self.dominant as usize] == self.total
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResidueTable {
    pub d_modulus: u64,
    pub x_modulus: u64,
    pub samples: usize,
    /// Only residue classes of D that occur in the sample.
    pub rows: Vec<ResidueRow>,
}

impl ResidueTable {
    pub fn deterministic_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.is_deterministic()).count()
    }
}

/// Tabulate x0 mod `x_modulus` by D mod `d_modulus`.
///
/// Panics if either modulus is zero.
pub fn residue_table(records: &[PellRecord], d_modulus: u64, x_modulus: u64) -> ResidueTable {
    assert!(d_modulus > 0 && x_modulus > 0, "moduli must be positive");

    let mut grid = vec![vec![0usize; x_modulus as usize]; d_modulus as usize];
    let mut samples = 0usize;

    for r in records {
        let x_res = if x_modulus == 8 {
            Some(r.x0_mod_8)
        } else {
            r.x0_mod(x_modulus)
        };
        match x_res {
            Some(x_res) => {
                grid[(r.d % d_modulus) as usize][x_res as usize] += 1;
                samples += 1;
            }
            None => log::warn!("D = {}: unparsable x0 '{}', skipped", r.d, r.x0),
        }
    }

    let rows = grid
        .into_iter()
        .enumerate()
        .filter_map(|(d_res, counts)| {
            let total: usize = counts.iter().sum();
            if total == 0 {
                return None;
            }
            let (dominant, &best) = counts
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;
            Some(ResidueRow {
                d_residue: d_res as u64,
                total,
                dominant: dominant as u64,
                dominant_share: best as f64 / total as f64,
                counts,
            })
        })
        .collect();

    ResidueTable {
        d_modulus,
        x_modulus,
        samples,
        rows,
    }
}

pub fn print_residue_table(table: &ResidueTable) {
    println!(
        "x0 mod {} by D mod {} ({} samples)",
        table.x_modulus, table.d_modulus, table.samples
    );
    let header: Vec<String> = (0..table.x_modulus).map(|r| format!("{:>5}", r)).collect();
    println!("  D mod {:<3} {:>6} |{} | dominant", table.d_modulus, "n", header.join(""));
    for row in &table.rows {
        let cells: Vec<String> = row.counts.iter().map(|c| format!("{:>5}", c)).collect();
        println!(
            "  {:>9} {:>6} |{} | {} ({:.1}%){}",
            row.d_residue,
            row.total,
            cells.join(""),
            row.dominant,
            100.0 * row.dominant_share,
            if row.is_deterministic() { " *" } else { "" }
        );
    }
    println!(
        "  {} of {} classes take a single x0 residue (*)",
        table.deterministic_rows(),
        table.rows.len()
    );
}
