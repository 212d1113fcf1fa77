use std::io;
use std::path::Path;

use tracing::info;

use super::dataset::{RegionDataset,SubRegionRow};
use super::error::{Error,Result};


/// Writes the sub-region table of a region as CSV.
pub fn sub_regions<W: io::Write>(rows: &[SubRegionRow], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
	writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn sub_regions_file(dataset: &RegionDataset, region: &str, path: &Path) -> Result<usize> {
    let record = dataset.get(region).ok_or_else(|| Error::MissingRegion(region.to_string()))?;
    sub_regions(&record.sub_regions, std::fs::File::create(path)?)?;
    info!("Wrote {} sub-regions of {} to {}", record.sub_regions.len(), region, path.display());
    Ok(record.sub_regions.len())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{RegionRecord,Region};
    use crate::metrics::Rgb;

    fn row(name: &str, sick: u64, delta: i64) -> SubRegionRow {
	SubRegionRow {
	    name: name.to_string(),
	    sick,
	    delta,
	    sick_class: "dtrr_danger4".to_string(),
	    delta_class: "dtrr_danger0".to_string(),
	    fill: Rgb(255, 127, 127),
	}
    }

    #[test]
    fn writes_header_and_rows() {
	let mut out = Vec::new();
	sub_regions(&[row("Київ", 120, -2), row("Lviv", 3, 1)], &mut out).unwrap();
	assert_eq!(String::from_utf8(out).unwrap(),
		   "name,sick,delta,sick_class,delta_class,fill\n\
		    Київ,120,-2,dtrr_danger4,dtrr_danger0,#ff7f7f\n\
		    Lviv,3,1,dtrr_danger4,dtrr_danger0,#ff7f7f\n");
    }

    #[test]
    fn exports_to_file() {
	let dir = tempfile::tempdir().unwrap();
	let dataset = RegionDataset::from_records(vec![RegionRecord {
	    region: Region { id: "ukr".to_string(), ..Region::default() },
	    sub_regions: vec![row("Lviv", 3, 1)],
	    ..RegionRecord::default()
	}]);
	let path = dir.path().join("ukr.csv");
	assert_eq!(sub_regions_file(&dataset, "ukr", &path).unwrap(), 1);
	assert!(std::fs::read_to_string(&path).unwrap().starts_with("name,sick"));
	match sub_regions_file(&dataset, "pol", &path) {
	    Err(Error::MissingRegion(id)) => assert_eq!(id, "pol"),
	    _ => panic!("expected a missing region")
	}
    }
}
