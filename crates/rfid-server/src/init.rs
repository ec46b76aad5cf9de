//! Reader start-up sequence

use crate::antenna::AntennaController;
use crate::context::ReaderContext;
use rfid_core::reader::PARAM_WRITE_ENABLE;
use rfid_core::{AntennaPort, ReaderDevice, ReaderRequest, ResponseCode, Result, format_tid};
use tracing::{info, warn};

/// Parameter value that unlocks system parameter writes
const WRITE_ENABLE: u8 = 0x80;

/// Open the reader and put it in its serving state
///
/// Reads the serial number, enables parameter writes and selects the north
/// antenna. Returns the serial number as hex when the reader reported one.
pub async fn initialize_reader<D: ReaderDevice>(
    ctx: &mut ReaderContext<D>,
    controller: &AntennaController,
) -> Result<Option<String>> {
    ctx.device_mut().open().await?;
    info!("Opened reader {}", ctx.device().name());

    let serial = read_serial_number(ctx.device_mut()).await;

    controller
        .write_parameter(ctx.device_mut(), PARAM_WRITE_ENABLE, WRITE_ENABLE)
        .await?;
    controller.select(ctx, AntennaPort::North).await?;

    Ok(serial)
}

/// Read the reader serial number; failures are logged, not fatal
pub async fn read_serial_number<D: ReaderDevice>(device: &mut D) -> Option<String> {
    if let Err(e) = device.issue(&ReaderRequest::read_serial_number()).await {
        warn!("Unable to read serial number from reader: {}", e);
        return None;
    }

    match device.response().await {
        Ok(Some(resp)) if resp.success && resp.code == ResponseCode::ReadSystemParameterPass => {
            let serial = format_tid(&resp.data);
            info!("Serial Number: {}", serial);
            Some(serial)
        }
        Ok(_) => {
            warn!("Unable to read serial number from reader");
            None
        }
        Err(e) => {
            warn!("Unable to read serial number from reader: {}", e);
            None
        }
    }
}
