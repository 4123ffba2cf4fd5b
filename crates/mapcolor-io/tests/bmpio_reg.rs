//! BMP I/O regression test
//!
//! Writes 32-bit BMP files to the regout directory and reads them back:
//!   - file round trip of a synthetic map (tests 0-2)
//!   - every validation failure maps to its code (tests 3-8)
//!
//! Run with:
//! ```
//! cargo test -p mapcolor-io --test bmpio_reg -- --nocapture
//! ```

use mapcolor_io::{BmpFile, IoError, read_bmp_file, write_bmp_file};
use mapcolor_test::{RegParams, ascii_map, regout_path, write_test_bmp};

fn code_of(result: Result<BmpFile, IoError>) -> f64 {
    match result {
        Ok(_) => 0.0,
        Err(e) => {
            eprintln!("  rejected: {}", e);
            e.code().map_or(-1.0, f64::from)
        }
    }
}

fn write_bytes(name: &str, bytes: &[u8]) -> String {
    let path = regout_path(name);
    std::fs::write(&path, bytes).expect("write bytes");
    path
}

// ============================================================================
// Tests 0-2: file round trip
// ============================================================================
#[test]
fn bmpio_reg_round_trip() {
    let mut rp = RegParams::new("bmpio_round_trip");
    let raster = ascii_map(&["AAB#", "ACB#", "CCBB"]).expect("map");

    let path = write_test_bmp("bmpio_map.bmp", &raster).expect("write");
    let bmp = read_bmp_file(&path).expect("read");
    rp.compare_raster(&raster, bmp.raster());
    rp.compare_values(4.0 * 4.0, bmp.row_pitch() as f64, 0.0);

    // Rewriting an unchanged file reproduces it byte for byte
    let copy = regout_path("bmpio_map_copy.bmp");
    write_bmp_file(&bmp, &copy).expect("rewrite");
    let a = std::fs::read(&path).expect("read first file");
    let b = std::fs::read(&copy).expect("read copy");
    rp.compare_strings(&a, &b);

    assert!(rp.cleanup(), "bmpio_reg round trip failed");
}

// ============================================================================
// Tests 3-8: validation codes
// ============================================================================
#[test]
fn bmpio_reg_validation() {
    let mut rp = RegParams::new("bmpio_validation");
    let raster = ascii_map(&["AB", "BA"]).expect("map");
    let good = BmpFile::from_raster(raster).encode();
    std::fs::create_dir_all(mapcolor_test::regout_dir()).expect("regout dir");

    // 1: missing file
    let missing = regout_path("bmpio_does_not_exist.bmp");
    let _ = std::fs::remove_file(&missing);
    rp.compare_values(1.0, code_of(read_bmp_file(&missing)), 0.0);

    // 2: signature
    let mut bytes = good.clone();
    bytes[1] = b'X';
    let path = write_bytes("bmpio_signature.bmp", &bytes);
    rp.compare_values(2.0, code_of(read_bmp_file(&path)), 0.0);

    // 3: zero data offset
    let mut bytes = good.clone();
    bytes[0x0a..0x0e].copy_from_slice(&0u32.to_le_bytes());
    let path = write_bytes("bmpio_offset.bmp", &bytes);
    rp.compare_values(3.0, code_of(read_bmp_file(&path)), 0.0);

    // 4: 24-bit pixels
    let mut bytes = good.clone();
    bytes[0x1c..0x1e].copy_from_slice(&24u16.to_le_bytes());
    let path = write_bytes("bmpio_depth.bmp", &bytes);
    rp.compare_values(4.0, code_of(read_bmp_file(&path)), 0.0);

    // 5: truncated pixel array
    let path = write_bytes("bmpio_short.bmp", &good[..good.len() - 3]);
    rp.compare_values(5.0, code_of(read_bmp_file(&path)), 0.0);

    // 6: zero height
    let mut bytes = good;
    bytes[0x16..0x1a].copy_from_slice(&0i32.to_le_bytes());
    let path = write_bytes("bmpio_dims.bmp", &bytes);
    rp.compare_values(6.0, code_of(read_bmp_file(&path)), 0.0);

    assert!(rp.cleanup(), "bmpio_reg validation failed");
}
