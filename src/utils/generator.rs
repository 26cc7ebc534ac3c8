//! Генераторы идентификаторов
//!
//! Источник случайности передается явно: глобального генератора нет.

use rand::Rng;

const ALPHANUMERIC_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NUMBERS: &[u8] = b"0123456789";
// без I, O, Q
const CHASSIS_CHARS: &[u8] = b"ABCDEFGHJKLMNPRZ0123456789";

pub const NATIONAL_ID_LENGTH: usize = 16;
pub const METER_NUMBER_LENGTH: usize = 6;
pub const CHASSIS_NUMBER_LENGTH: usize = 17;

fn pick<R: Rng + ?Sized>(rng: &mut R, charset: &[u8], count: usize) -> String {
    (0..count)
        .map(|_| char::from(charset[rng.gen_range(0..charset.len())]))
        .collect()
}

/// 16 символов `[A-Z0-9]`
pub fn generate_national_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(rng, ALPHANUMERIC_CHARS, NATIONAL_ID_LENGTH)
}

/// Номерной знак формата `XXX123X`
pub fn generate_car_plate<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut plate = pick(rng, LETTERS, 3);
    plate.push_str(&pick(rng, NUMBERS, 3));
    plate.push_str(&pick(rng, LETTERS, 1));
    plate
}

/// Шестизначный номер счетчика
pub fn generate_meter_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(rng, NUMBERS, METER_NUMBER_LENGTH)
}

/// 17 символов, соответствует `^[A-HJ-NPR-Z0-9]{17}$`
pub fn generate_chassis_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(rng, CHASSIS_CHARS, CHASSIS_NUMBER_LENGTH)
}
