//! Known-good RSA keys for tests, benchmarks and default configuration
//!
//! All keys were checked with an independent implementation:
//! `(m^E mod N)^D mod N == m`, `P*Q == N`, `dP == D mod (P-1)`,
//! `dQ == D mod (Q-1)`, `qInv * Q == 1 mod P`.

use crate::{CrtConfig, KeyConfig};

const E_65537: &str = "0x010001";

const REFERENCE_1024_N: &str = concat!(
    "0x803592FEE464EF01A013527FA3EB96B1770DDEE9BA28A1DA5CF748E7224912B13F960F896212B1653E0CC0856D98CC46",
    "628681A1FBEBC058ACACCBA67DF2E8524AED315B08E52A05DF151B516141122667327FD4D5795E2A93B00676F9C01AE5",
    "B1F4CC2EED4769333D9531E6B35B5360070C29E6CFCA03619C01ECB08538BC5F",
);

const REFERENCE_1024_D: &str = concat!(
    "0x7AABC8141E8FFCA77F743D71677418E1805A43393B277985A781EBBD4B6EC375D8B349F657622F5E017ACE125C84E09F",
    "4FD206E2E859EFD6689184E1AE8CE67FB9B56C3D42052FDACE4A2EB233EDA40A6E538DF53D19F2ADC886767F7157A1B2",
    "FCFF5CDCBF5EB4A822053AB2A4FB9B1AAECB4EF408AEE537BD10922757957401",
);

/// 1024-bit modulus, E = 65537, no CRT components
pub fn reference_1024() -> KeyConfig {
    KeyConfig::new(REFERENCE_1024_N, E_65537, REFERENCE_1024_D)
}

/// 1024-bit modulus, E = 65537, with CRT components
pub fn crt_1024() -> KeyConfig {
    KeyConfig::new(
        concat!(
            "0xB6C81A986198BE3512FD282A15D2B796755DB065E1EA887B854EE7C46ACB96F189DFFC8BA33C230EE6BFD65A61117753",
            "B1237B737FA77F41137F4903E0FF3BAC8C01FAC202F542AAE4F266C54BF1B86316C357F93CE75706B4DFDF351FD6EB51",
            "032C71526007EE1A9DCDE458F5474F69A5533BCA7E31EB74DAAE3D4F0613C2DB",
        ),
        E_65537,
        concat!(
            "0xB67C6C090D0FA97F65B8F89BA3F4203508728486039ADBAEAEF68B70CFCAF9A5A728C8844571E9F29BB095FAE004C724",
            "F8AADB3B020D2180C04D898164E68E14D199EB776CC6F2ABBFBBF2D97CF542AC7FA0DC0C41B71CC3F6998E3A4EECB8DD",
            "D1197AD4F8AA0A4257ABFAC4CF90D2A0975E9306278C68C2371A3F0FA5CA9309",
        ),
    )
    .with_crt(CrtConfig {
        p: concat!(
            "0xF179C5B2A60BCBBF0644E833433BAA2D6A544C989FF19F15841B3B60F163DAD1FA2553A3E93816B873A3BE004B089DB5",
            "E8D94E990C6D254E3EA9DCEC64A2CB65",
        ).into(),
        q: concat!(
            "0xC1C690918D10D79FD61645F6610F8B4836BC696F1320D12373044B1BEDB97C96D4D268218C84BBA768A2733F6A8DF002",
            "E0F0B785B3C146689737F25F9D5A113F",
        ).into(),
        dp: concat!(
            "0xDFE2B26CF7CCFA044BB0B9C545B1DD0FAC852A5B5BF82F3248C0E2E5F8094809E52E9484E5A7EE50E84EC9CC05C5A04B",
            "D7EF1B1385D4F080C252C5959B9CE08D",
        ).into(),
        dq: concat!(
            "0x74E5C4F10998CF7BAD3B62996F946101FF834A57A7C274685E4A88C5207475A4C85EE652D6E27C12521D2E49638E9CEC",
            "1FA7180FA091485870615FE62E96D73",
        ).into(),
        qinv: concat!(
            "0xE21E9D1A1387E87B382B944801FE0C56919CB940ECF3D5C5660D915F45A368037E3E83F3E4E243413FFE1636A9D4C259",
            "706709A71C2C477E1A667FF7A27EBB8C",
        ).into(),
    })
}

/// 512-bit modulus, E = 65537, with CRT components
pub fn crt_512() -> KeyConfig {
    KeyConfig::new(
        concat!(
            "0xD0BAA2360991D63A9DD7579DA370510ED13E88FF0D861AE3249AAB588EEE3FD1A741E2C84D656E864B5C6DE2A1D023A3",
            "1E03EAD4D17E4A56A4848B708DFD4149",
        ),
        E_65537,
        concat!(
            "0x6A5DC14DD2409C3010C16D27AAE3109B816BE1BA3FB5083C9A29AB899C84B2C602D491944CD9643E8260BD7183537F04",
            "1107C8CDC1EC4CB09D4A128961EB8D51",
        ),
    )
    .with_crt(CrtConfig {
        p: "0xF78D248418B8BD3C48281D68DE67ADE52C2B5ADE9FD5FABF481979C33CE6D3CD".into(),
        q: "0xD7DA4CE39C7D28AF7D4BD92F7503AC549193ED9120D8CE100B69C275AF8C5F6D".into(),
        dp: "0xAFF01E4DCC0C3062519E4118B148DAAC9031D809756BED2459A7D184531A72D9".into(),
        dq: "0xD4E5FBF083E8EEB8285D275A278FF7E971ACF624AEC1287DAAC42588EE1D0601".into(),
        qinv: "0xD740A4CE2D15C42FFD22C2AFAC23CB15B6407C3D9A31C763406A23C6DD61CC6".into(),
    })
}

/// 1024-bit modulus, E = 17, with CRT components
pub fn crt_1024_e17() -> KeyConfig {
    KeyConfig::new(
        concat!(
            "0xD449EDADA89FF0318C81FC197880B409C095E7813EA31D8CA1CEA289E5082932B4F466CF338131017562BC03ED6949BC",
            "C28E6C2C9284916C9810CC346DE0D6F8BEC5E573764335AD82131DA2E8B8FB10F1DD5D39A4705C965550AAF5EBF3DABA",
            "E46EA0472FD3337F599F74EC418C77748DEEEF969864EBAF2CA7DC07E491F237",
        ),
        "0x11",
        concat!(
            "0xA256A6B1F96B3F34F2F9FD046B353E61CF81B1087B3170F31252B88791063D9F3F153F8F639F075B77E2174E4C235681",
            "497BF85E51ECE7AD653A0591813377354A93E2B57B104C4BF8057F0D6339B6998D5E028843ECC65EE8F4E9005861F112",
            "A22F64CFC5D627F7BB5195936E4E44F44AAC7BDB03244B5195F0EB2C8FE1A301",
        ),
    )
    .with_crt(CrtConfig {
        p: concat!(
            "0xFA242E9E98BB0377889385DFD3962D8D4718F057037F290CB68306491835EEEF1E32A17E1996B4B8E9A082B4D8F8D4FB",
            "C0AB9025A0AF955F75CA0FC032D53C19",
        ).into(),
        q: concat!(
            "0xD942C97163FCBABEF03D541409888FF5F1E7071CBE456B34E4524C98AEEF13022D39187E4E9A994767592E9DFFB720EA",
            "92FF5B03CC371B33CB67AC6FE1E46ACF",
        ).into(),
        dp: concat!(
            "0xDCB6837CE11D7B8796A048F2ABA2A0A9D5523D79F406C9DE0A739C2260A80F0F38C343330784F9D055ABBE9F9244F829",
            "6DC48E3F518BDE270D942C03F09E07D9",
        ).into(),
        dq: concat!(
            "0xBFB366731BFD1D3F10361D029F00068DB75360A0E41F225BD884DA2C5E1E3DF2DC9BCA51546A4B02C499FBF4D2928674",
            "9FD2413F96128169EFB5D462B84203E3",
        ).into(),
        qinv: concat!(
            "0x9C4736698EB03BC9B5F2C01943417F6D6B867C01E6AEC36C8B5B83095011C30F1638A308CE84FC7BF44368059BACAEF5",
            "70EE0F672087DDC61CA997005FCC4740",
        ).into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrivateKeyVariant;
    use num_bigint::BigUint;

    fn round_trip(key: &KeyConfig, variant: PrivateKeyVariant) {
        let public = key.public_key().unwrap();
        let m = BigUint::from(0xdead_beef_u64);
        let c = m.modpow(&public.e, &public.n);
        let private = key.private_key(variant).unwrap();
        let back = match private {
            crate::PrivateKey::Type1 { n, d } => c.modpow(&d, &n),
            crate::PrivateKey::Type2 { p, q, dp, dq, qinv } => {
                let m1 = c.modpow(&dp, &p);
                let m2 = c.modpow(&dq, &q);
                let diff = (&m1 + &p - (&m2 % &p)) % &p;
                let h = (qinv * diff) % &p;
                m2 + h * q
            }
        };
        assert_eq!(back, m);
    }

    #[test]
    fn test_fixture_keys_round_trip() {
        round_trip(&reference_1024(), PrivateKeyVariant::Type1);
        for key in [crt_1024(), crt_512(), crt_1024_e17()] {
            round_trip(&key, PrivateKeyVariant::Type1);
            round_trip(&key, PrivateKeyVariant::Type2);
        }
    }

    #[test]
    fn test_fixture_widths() {
        assert_eq!(reference_1024().public_key().unwrap().bits_n(), 1024);
        assert_eq!(crt_1024().public_key().unwrap().bits_n(), 1024);
        assert_eq!(crt_512().public_key().unwrap().bits_n(), 512);
        assert_eq!(crt_1024_e17().public_key().unwrap().e, BigUint::from(17u32));
    }
}
