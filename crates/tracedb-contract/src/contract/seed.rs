use crate::{
    config::ContractConfig,
    contract::{AssetContract, PartContract},
    model::{Asset, Part},
};
use tracedb_core::prelude::*;

const SEED_DATE: &str = "2023-05-15";

fn part(
    pid: &str,
    manufacturer: &str,
    location: &str,
    name: &str,
    number: &str,
    organization: &str,
) -> Part {
    Part {
        pid: pid.to_string(),
        manufacturer: manufacturer.to_string(),
        manufacture_location: location.to_string(),
        part_name: name.to_string(),
        part_number: number.to_string(),
        organization: organization.to_string(),
        manufacture_date: SEED_DATE.to_string(),
        transfer_date: String::new(),
    }
}

/// The four reference components, as held by their manufacturers.
#[must_use]
pub fn reference_parts() -> [Part; 4] {
    [
        part(
            "IVSLAB-S23FA0001",
            "Security.Co",
            "Taiwan",
            "SecurityChip-v1",
            "SPN3R1C00AA1",
            "Security-Org",
        ),
        part(
            "IVSLAB-N23FA0001",
            "Network.Co",
            "Taiwan",
            "NetworkChip-v1",
            "NPN3R1C00AA1",
            "Network-Org",
        ),
        part(
            "IVSLAB-C23FA0001",
            "CMOS.Co",
            "USA",
            "CMOSChip-v1",
            "CPN3R1C00AA1",
            "CMOS-Org",
        ),
        part(
            "IVSLAB-V23FA0001",
            "VideoCodec.Co",
            "USA",
            "VideoCodecChip-v1",
            "VPN3R1C00AA1",
            "VideoCodec-Org",
        ),
    ]
}

/// The reference asset, naming its components by PID only.
#[must_use]
pub fn reference_asset() -> Asset {
    let [security, network, cmos, video] = reference_parts().map(|p| Part::tombstone(&p.pid));

    Asset {
        id: "IVSLAB-PVC23FG0001".to_string(),
        made_by: "Brand.Co".to_string(),
        made_in: "Taiwan".to_string(),
        serial_number: "IVSPN902300AACDC01".to_string(),
        security_chip: security,
        network_chip: network,
        cmos_chip: cmos,
        video_codec_chip: video,
        production_date: SEED_DATE.to_string(),
    }
}

/// Seed the reference parts, hand them to the assembly organization and
/// assemble the reference asset.
pub fn init_ledger<S: LedgerState + ?Sized>(
    config: &ContractConfig,
    state: &mut S,
) -> Result<(), InternalError> {
    let parts = PartContract::new(config);
    let assets = AssetContract::new(config);

    for part in reference_parts() {
        parts.create_part(state, &part)?;
        parts.transfer_part(state, &part.pid, SEED_DATE, &config.assembly_organization)?;
    }
    assets.create_asset(state, &reference_asset())?;

    Ok(())
}
