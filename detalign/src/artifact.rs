use std::{
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use fs_err::File;
use serde::{de::DeserializeOwned, Serialize};

/// A pipeline intermediate that is persisted between stages.
///
/// JSON is the interchange format shared with the external aligner and model scripts, bincode is
/// a compact form for caching large corpora.
pub trait Artifact: Serialize + DeserializeOwned {
    fn name() -> &'static str;

    fn load<P: AsRef<Path>>(p: P) -> Result<Self, crate::Error> {
        let reader = BufReader::new(File::open(p.as_ref())?);
        Self::from_reader(reader)
    }

    fn from_reader<R: Read>(reader: R) -> Result<Self, crate::Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), crate::Error> {
        Ok(serde_json::to_writer(writer, self)?)
    }

    fn save<P: AsRef<Path>>(&self, p: P) -> Result<(), crate::Error> {
        let mut writer = BufWriter::new(File::create(p.as_ref())?);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn from_binary<R: Read>(reader: R) -> Result<Self, crate::Error> {
        Ok(bincode::deserialize_from(reader)?)
    }

    fn to_binary<W: Write>(&self, writer: W) -> Result<(), crate::Error> {
        Ok(bincode::serialize_into(writer, self)?)
    }
}
