pub mod bmp;
pub mod jpeg;
pub mod png_stream;

pub use bmp::{decode_bmp, decode_bmp_file, encode_bmp, encode_bmp_file, FileHeader, InfoHeader};
pub use jpeg::{decode_jpeg, decode_jpeg_file, DecodedJpeg, ImageCrateJpeg, JpegEngine, JpegEngineError};
pub use png_stream::{
    decode_png, decode_png_file, decode_rows, PngRowSource, RowBlock, RowSource, DEFAULT_BLOCK_ROWS,
};
