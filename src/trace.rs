use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LossRecord {
    pub iteration: usize,
    pub loss: f64,
}

pub fn write_losses<W: io::Write>(writer: W, losses: &[f64]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    for (iteration, &loss) in losses.iter().enumerate() {
        writer.serialize(LossRecord { iteration, loss })?;
    }

    writer.flush()?;

    Ok(())
}

pub fn save_losses(path: impl AsRef<Path>, losses: &[f64]) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;

    write_losses(file, losses)
}

pub fn read_losses<R: io::Read>(reader: R) -> Result<Vec<LossRecord>, csv::Error> {
    csv::Reader::from_reader(reader).deserialize().collect()
}
