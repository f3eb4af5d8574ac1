use fake::{Dummy, Fake};
use rand::RngCore;

use crate::faker_rs::locales::LocaleKey;

/// Realistic-text generators backed by the `fake` crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FakerKind {
    Username,
    FirstName,
    LastName,
    Name,
    Email,
    FullAddress,
    StreetAddress,
    City,
    State,
    ZipCode,
    PhoneNumber,
    Company,
}

impl FakerKind {
    pub const ALL: &'static [FakerKind] = &[
        Self::Username,
        Self::FirstName,
        Self::LastName,
        Self::Name,
        Self::Email,
        Self::FullAddress,
        Self::StreetAddress,
        Self::City,
        Self::State,
        Self::ZipCode,
        Self::PhoneNumber,
        Self::Company,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Name => "name",
            Self::Email => "email",
            Self::FullAddress => "full_address",
            Self::StreetAddress => "street_address",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zip_code",
            Self::PhoneNumber => "phone_number",
            Self::Company => "company",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.id() == id)
    }
}

macro_rules! fake_text {
    ($locale:ident, $kind:expr, $rng:expr) => {{
        use fake::faker::address::$locale::{
            BuildingNumber, CityName, StateName, StreetName, ZipCode,
        };
        use fake::faker::company::$locale::CompanyName;
        use fake::faker::internet::$locale::{SafeEmail, Username};
        use fake::faker::name::$locale::{FirstName, LastName, Name};
        use fake::faker::phone_number::$locale::PhoneNumber;

        let rng = $rng;
        match $kind {
            FakerKind::Username => text(Username(), rng),
            FakerKind::FirstName => text(FirstName(), rng),
            FakerKind::LastName => text(LastName(), rng),
            FakerKind::Name => text(Name(), rng),
            FakerKind::Email => text(SafeEmail(), rng),
            FakerKind::FullAddress => {
                let building: String = BuildingNumber().fake_with_rng(rng);
                let street: String = StreetName().fake_with_rng(rng);
                let city: String = CityName().fake_with_rng(rng);
                let state: String = StateName().fake_with_rng(rng);
                let zip: String = ZipCode().fake_with_rng(rng);
                format!("{building} {street}, {city}, {state} {zip}")
            }
            FakerKind::StreetAddress => {
                let building: String = BuildingNumber().fake_with_rng(rng);
                let street: String = StreetName().fake_with_rng(rng);
                format!("{building} {street}")
            }
            FakerKind::City => text(CityName(), rng),
            FakerKind::State => text(StateName(), rng),
            FakerKind::ZipCode => text(ZipCode(), rng),
            FakerKind::PhoneNumber => text(PhoneNumber(), rng),
            FakerKind::Company => text(CompanyName(), rng),
        }
    }};
}

fn text<F>(faker: F, rng: &mut dyn RngCore) -> String
where
    String: Dummy<F>,
{
    faker.fake_with_rng(rng)
}

pub struct FakeRsAdapter;

impl FakeRsAdapter {
    pub fn generate_text(kind: FakerKind, locale: LocaleKey, rng: &mut dyn RngCore) -> String {
        match locale {
            LocaleKey::EnUs => fake_text!(en, kind, rng),
            LocaleKey::FrFr => fake_text!(fr_fr, kind, rng),
            LocaleKey::PtBr => fake_text!(pt_br, kind, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn every_kind_produces_text_in_every_locale() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for &locale in LocaleKey::ALL {
            for &kind in FakerKind::ALL {
                let value = FakeRsAdapter::generate_text(kind, locale, &mut rng);
                assert!(!value.is_empty(), "{} in {locale} was empty", kind.id());
            }
        }
    }

    #[test]
    fn kind_ids_parse_back() {
        for &kind in FakerKind::ALL {
            assert_eq!(FakerKind::parse(kind.id()), Some(kind));
        }
        assert_eq!(FakerKind::parse("ssn"), None);
    }
}
