//! Instruction mnemonics
//!
//! One canonical table is used: ISO/IEC 7816-4 inter-industry instructions,
//! with the proprietary meanings that apply when the class byte is `0x80`
//! for a handful of overloaded codes (`0C`, `0E`, `20`, `82`, `84`, `CA`, `FA`).

/// Class byte that switches overloaded instructions to their proprietary meaning
pub const PROPRIETARY_CLASS: u8 = 0x80;

/// Resolve the mnemonic for an instruction byte.
///
/// Returns `None` for codes outside the table; an unknown instruction is not
/// an error.
pub const fn instruction_name(cla: u8, ins: u8) -> Option<&'static str> {
    let proprietary = cla == PROPRIETARY_CLASS;
    let name = match ins {
        0x04 => "DEACTIVATE",
        0x06 => "DEACTIVATE RECORD",
        0x08 => "ACTIVATE RECORD",
        0x0C if proprietary => "DELETE RECORD",
        0x0C => "ERASE RECORD",
        0x0E if proprietary => "SET LOGICAL EOF",
        0x0E => "ERASE BINARY",
        0x20 if proprietary => "GET PIN STATUS",
        0x20 => "VERIFY",
        0x22 => "MANAGE SECURITY ENVIRONMENT",
        0x24 => "CHANGE REFERENCE DATA",
        0x26 => "DISABLE VERIFICATION REQUIREMENT",
        0x28 => "ENABLE VERIFICATION REQUIREMENT",
        0x2A => "PERFORM SECURITY OPERATION",
        0x2C => "RESET RETRY COUNTER",
        0x44 => "ACTIVATE",
        0x46 => "GENERATE ASYMMETRIC KEY PAIR",
        0x70 => "MANAGE CHANNEL",
        0x82 if proprietary => "GET SECURITY STATUS KEY",
        0x82 => "EXTERNAL / MUTUAL AUTHENTICATE",
        0x84 if proprietary => "GET RANDOM",
        0x84 => "GET CHALLENGE",
        0x86 => "GENERAL AUTHENTICATE",
        0x88 => "INTERNAL AUTHENTICATE",
        0xA0 => "SEARCH BINARY",
        0xA2 => "SEARCH RECORD",
        0xA4 => "SELECT",
        0xB0 => "READ BINARY",
        0xB2 => "READ RECORD",
        0xC0 => "GET RESPONSE",
        0xC2 => "ENVELOPE",
        0xCA if proprietary => "LIST PUBLIC KEY",
        0xCA => "GET DATA",
        0xD0 => "WRITE BINARY",
        0xD2 => "WRITE RECORD",
        0xD6 => "UPDATE BINARY",
        0xDA => "PUT DATA",
        0xDC => "UPDATE RECORD",
        0xE0 => "CREATE",
        0xE2 => "APPEND RECORD",
        0xE4 => "DELETE",
        0xE6 => "TERMINATE DF",
        0xE8 => "TERMINATE",
        0xEA => "LOAD APPLICATION",
        0xFA if proprietary => "FINGERPRINT",
        0xFE => "TERMINATE CARD USAGE",
        _ => return None,
    };
    Some(name)
}
