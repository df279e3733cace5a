use std::io::Cursor;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{ImageFormat, Rgb, RgbImage};
use sha2::{Digest, Sha256};

use super::{
    GenerateRequest, GenerateResponse, GenerativeClient, InlineMedia, ResponseModality,
    ResponsePart,
};

const DRYRUN_IMAGE_SIZE: u32 = 64;

/// Offline provider with deterministic output, for demos and tests.
pub struct DryrunClient;

impl GenerativeClient for DryrunClient {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        match request.modality {
            ResponseModality::Text => Ok(GenerateResponse {
                parts: vec![ResponsePart::Text(dryrun_blueprint(request))],
            }),
            ResponseModality::TextAndImage => {
                let png = dryrun_png(&request.instruction)?;
                Ok(GenerateResponse {
                    parts: vec![
                        ResponsePart::Text("Dry-run image.".to_string()),
                        ResponsePart::InlineData(InlineMedia {
                            mime_type: "image/png".to_string(),
                            data: BASE64.encode(png),
                        }),
                    ],
                })
            }
        }
    }
}

fn dryrun_blueprint(request: &GenerateRequest) -> String {
    let headline = request
        .instruction
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("Event");
    format!(
        "DRY-RUN BLUEPRINT [{}]\n\
         {headline}\n\n\
         1. Venue type: multi-purpose hall with open floor.\n\
         2. Spatial map: entrance on the south wall, windows along the east wall, \
         approx. 20m x 12m using door height (2.1m) as reference.\n\
         3. Constraints: two support columns near the centre line; single service door.\n\
         4. Layout: stage on the north wall, round tables for guests in the centre, \
         bar beside the entrance, dance floor in front of the stage.\n\
         Media analysed: {}",
        short_id(&request.instruction),
        request.media.len()
    )
}

fn dryrun_png(instruction: &str) -> Result<Vec<u8>> {
    let (r, g, b) = color_from_instruction(instruction);
    let image = RgbImage::from_pixel(DRYRUN_IMAGE_SIZE, DRYRUN_IMAGE_SIZE, Rgb([r, g, b]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("failed to encode dry-run image")?;
    Ok(bytes)
}

fn color_from_instruction(instruction: &str) -> (u8, u8, u8) {
    let digest = Sha256::digest(instruction.as_bytes());
    (digest[0], digest[1], digest[2])
}

fn short_id(instruction: &str) -> String {
    let digest = Sha256::digest(instruction.as_bytes());
    hex::encode(&digest[..4])
}
