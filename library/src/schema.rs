table! {
    iaq (id) {
        id -> BigInt,
        location -> Text,
        #[sql_name = "recTime"]
        rec_time -> Timestamp,
        temp -> Double,
        #[sql_name = "rH"]
        rh -> Double,
        pmass1 -> Double,
        pmass25 -> Double,
        pmass4 -> Double,
        pmass10 -> Double,
        pcount1 -> Double,
        pcount25 -> Double,
        pcount4 -> Double,
        pcount10 -> Double,
        #[sql_name = "typPartSize"]
        typ_part_size -> Double,
        #[sql_name = "HCHO"]
        hcho -> Double,
        #[sql_name = "CO2"]
        co2 -> Double,
        #[sql_name = "indoorTd"]
        indoor_td -> Double,
    }
}
