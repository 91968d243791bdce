//! Detokenize a few captured console lines.
//!
//! Run with: cargo run --example detokenize_text

use tokenlog::protocol::Frame;
use tokenlog::{Detokenizer, TokenTable};

const DATABASE: &str = "\
00000001,          ,\"boot complete\"
0000002a,          ,\"answer=%d\"
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let table = TokenTable::from_csv_reader(DATABASE.as_bytes())?;
    let detokenizer = Detokenizer::new(table);

    let captured = [
        "I (120) main: $AQAAAA==",
        "I (121) main: prefix $KgAAACoAAAA= suffix",
        "W (122) main: $//79/IA= is not a known token",
    ];
    for line in captured {
        println!("{}", detokenizer.detokenize_text(line));
    }

    let frame = Frame::from_slice(&[0x2A, 0, 0, 0, 0x07, 0, 0, 0]);
    println!("{}", detokenizer.detokenize(&frame));

    Ok(())
}
