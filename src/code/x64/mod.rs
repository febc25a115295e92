use iced_x86::{Decoder, DecoderOptions, Formatter, NasmFormatter};

use crate::memory::Address;

/// Recommended multi-byte NOP encodings, indexed by length - 1
const NOPS: [&[u8]; 9] = [
    &[0x90],
    &[0x66, 0x90],
    &[0x0f, 0x1f, 0x00],
    &[0x0f, 0x1f, 0x40, 0x00],
    &[0x0f, 0x1f, 0x44, 0x00, 0x00],
    &[0x66, 0x0f, 0x1f, 0x44, 0x00, 0x00],
    &[0x0f, 0x1f, 0x80, 0x00, 0x00, 0x00, 0x00],
    &[0x0f, 0x1f, 0x84, 0x00, 0x00, 0x00, 0x00, 0x00],
    &[0x66, 0x0f, 0x1f, 0x84, 0x00, 0x00, 0x00, 0x00, 0x00],
];

/// Generates `len` bytes of NOPs, using the fewest instructions possible
pub fn nop(len: usize) -> Vec<u8> {
    let mut code = Vec::with_capacity(len);
    let mut remaining = len;
    while remaining > 0 {
        let size = remaining.min(NOPS.len());
        code.extend_from_slice(NOPS[size - 1]);
        remaining -= size;
    }
    code
}

/// Disassembles `code` as if it were located at `address`, one line per instruction
pub fn disassemble(address: Address, code: &[u8]) -> Vec<String> {
    let decoder = Decoder::with_ip(64, code, address as u64, DecoderOptions::NONE);
    let mut formatter = NasmFormatter::new();
    decoder
        .into_iter()
        .map(|instr| {
            let mut text = String::new();
            formatter.format(&instr, &mut text);
            format!("{:#x}: {}", instr.ip(), text)
        })
        .collect()
}
